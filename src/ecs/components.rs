//! Common ECS components

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Local transform component: position, rotation, and scale relative to the
/// entity's parent, or to the world origin for root entities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to the parent
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
    /// Scale factor
    pub scale: Vec3,
}

impl Transform {
    /// Create a new transform at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform at the given 2D position (z = 0)
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self::from_position(Vec3::new(x, y, 0.0))
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Get the transformation matrix (translation * rotation * scale)
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the rotation angle around the Z axis, in radians
    pub fn rotation_z(&self) -> f32 {
        let (z, _y, _x) = self.rotation.to_euler(EulerRot::ZYX);
        z
    }

    /// Translate by a delta
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Rotate around the Z axis by an angle in radians
    pub fn rotate_z(&mut self, angle: f32) {
        self.rotation = Quat::from_rotation_z(angle) * self.rotation;
    }

    /// Return a copy with uniform scale applied
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Name component for debugging and scene snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_matrix_translation() {
        let transform = Transform::from_xy(10.0, 20.0);
        let col3 = transform.matrix().col(3);
        assert!((col3.x - 10.0).abs() < 1e-5);
        assert!((col3.y - 20.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_z_round_trip() {
        let mut transform = Transform::default();
        transform.rotate_z(0.5);
        assert!((transform.rotation_z() - 0.5).abs() < 1e-5);
    }
}
