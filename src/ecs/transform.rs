//! World-space transforms and hierarchy propagation
//!
//! [`propagate_transforms`] rebuilds every entity's [`WorldTransform`] from
//! its local [`Transform`] and ancestor chain, once per frame. The pass is
//! not incremental: each entity is recomputed from scratch, so the result is
//! always consistent with the current local transforms.

use glam::{Mat4, Quat, Vec3};
use hecs::Entity;

use crate::debug_check;
use crate::ecs::hierarchy::{Parent, children_of, parent_of};
use crate::ecs::{Transform, World};

/// World-space transform, computed by [`propagate_transforms`].
///
/// Owned by the propagation pass; other systems treat it as read-only. For
/// root entities it equals the local transform's matrix.
#[derive(Debug, Clone, Copy)]
pub struct WorldTransform {
    /// World-space transformation matrix
    pub matrix: Mat4,
}

impl WorldTransform {
    /// Create from a transformation matrix
    #[must_use]
    pub const fn new(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// Create identity transform
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }

    /// Get world position
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.matrix.col(3).truncate()
    }

    /// Get world rotation (from matrix decomposition)
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_mat4(&self.matrix)
    }

    /// Get world scale
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        Vec3::new(
            self.matrix.col(0).truncate().length(),
            self.matrix.col(1).truncate().length(),
            self.matrix.col(2).truncate().length(),
        )
    }

    /// Get the rotation angle around the Z axis, in radians, read from the
    /// upper-left 2x2 basis of the matrix
    #[must_use]
    pub fn angle(&self) -> f32 {
        let x_axis = self.matrix.col(0);
        x_axis.y.atan2(x_axis.x)
    }

    /// Transform a point from this entity's local space to world space
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point3(point)
    }
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Recompute [`WorldTransform`] for every entity, parent before child.
///
/// Roots are entities with a [`Transform`] and no [`Parent`]. Each root's
/// subtree is walked depth-first, siblings in child-list order. Stale child
/// handles are skipped.
pub fn propagate_transforms(world: &mut World) {
    let mut roots: Vec<Entity> = world
        .query::<&Transform>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    roots.retain(|&entity| !world.has::<Parent>(entity));

    for root in roots {
        propagate_entity(world, root, Mat4::IDENTITY);
    }
}

fn propagate_entity(world: &mut World, entity: Entity, parent_matrix: Mat4) {
    let local_matrix = world
        .cloned::<Transform>(entity)
        .map(|t| t.matrix())
        .unwrap_or(Mat4::IDENTITY);
    let world_matrix = parent_matrix * local_matrix;
    let _ = world.insert(entity, WorldTransform::new(world_matrix));

    for child in children_of(world, entity) {
        if world.is_alive(child) {
            propagate_entity(world, child, world_matrix);
        }
    }
}

/// Convert a world-space point into `parent`'s local space.
///
/// With no parent the point is already local. The parent must have a
/// [`WorldTransform`] from an earlier propagation pass; a missing one is a
/// checked programming error and the point is returned unchanged.
pub fn world_to_local(world: &World, point: Vec3, parent: Option<Entity>) -> Vec3 {
    let Some(parent) = parent else {
        return point;
    };
    match world.get::<WorldTransform>(parent) {
        Ok(world_transform) => world_transform.matrix.inverse().transform_point3(point),
        Err(_) => {
            debug_check!(
                false,
                "world_to_local: {:?} has no world transform, run propagation first",
                parent
            );
            point
        }
    }
}

/// Get an entity's world-space rotation angle around the Z axis.
///
/// Returns 0 (as a checked programming error) when the entity has no
/// [`WorldTransform`] yet.
pub fn world_angle(world: &World, entity: Entity) -> f32 {
    match world.get::<WorldTransform>(entity) {
        Ok(world_transform) => world_transform.angle(),
        Err(_) => {
            debug_check!(
                false,
                "world_angle: {:?} has no world transform, run propagation first",
                entity
            );
            0.0
        }
    }
}

/// Assign a world-space pose by computing the equivalent local transform.
///
/// The next propagation pass reproduces the requested pose exactly. For a
/// parented entity this requires the parent's [`WorldTransform`] to be
/// current.
pub fn set_world_transform(
    world: &mut World,
    entity: Entity,
    position: Vec3,
    scale: Vec3,
    rotation: Quat,
) {
    if !debug_check!(
        world.is_alive(entity),
        "set_world_transform: {:?} is not alive",
        entity
    ) {
        return;
    }
    let desired = Mat4::from_scale_rotation_translation(scale, rotation, position);
    let local_matrix = match parent_of(world, entity) {
        Some(parent) => match world.get::<WorldTransform>(parent) {
            Ok(parent_world) => parent_world.matrix.inverse() * desired,
            Err(_) => {
                debug_check!(
                    false,
                    "set_world_transform: parent {:?} has no world transform",
                    parent
                );
                desired
            }
        },
        None => desired,
    };
    let (scale, rotation, position) = local_matrix.to_scale_rotation_translation();
    let _ = world.insert(
        entity,
        Transform {
            position,
            rotation,
            scale,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::hierarchy::set_parent;
    use std::f32::consts::FRAC_PI_2;

    fn world_position(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<WorldTransform>(entity)
            .expect("world transform missing")
            .position()
    }

    #[test]
    fn test_child_translation_composes() {
        let mut world = World::new();
        let root = world.spawn((Transform::from_position(Vec3::new(10.0, 0.0, 0.0)),));
        let child = world.spawn((Transform::from_position(Vec3::new(5.0, 0.0, 0.0)),));
        set_parent(&mut world, child, Some(root));

        propagate_transforms(&mut world);

        let pos = world_position(&world, child);
        assert!((pos - Vec3::new(15.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_root_rotation_rotates_child_offset() {
        let mut world = World::new();
        let root = world.spawn((Transform::from_position_rotation(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_rotation_z(FRAC_PI_2),
        ),));
        let child = world.spawn((Transform::from_position(Vec3::new(5.0, 0.0, 0.0)),));
        set_parent(&mut world, child, Some(root));

        propagate_transforms(&mut world);

        // A 90 degree rotation at the root turns the child's +X offset into +Y.
        let pos = world_position(&world, child);
        assert!((pos - Vec3::new(10.0, 5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_deep_chain_accumulates() {
        let mut world = World::new();
        let a = world.spawn((Transform::from_xy(1.0, 0.0),));
        let b = world.spawn((Transform::from_xy(2.0, 0.0),));
        let c = world.spawn((Transform::from_xy(3.0, 0.0),));
        set_parent(&mut world, b, Some(a));
        set_parent(&mut world, c, Some(b));

        propagate_transforms(&mut world);

        let pos = world_position(&world, c);
        assert!((pos.x - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_world_to_local_round_trip() {
        let mut world = World::new();
        let root = world.spawn((Transform::from_position_rotation(
            Vec3::new(100.0, 50.0, 0.0),
            Quat::from_rotation_z(0.7),
        ),));
        let local = Vec3::new(12.0, -3.0, 0.0);
        let child = world.spawn((Transform::from_position(local),));
        set_parent(&mut world, child, Some(root));

        propagate_transforms(&mut world);

        let world_pos = world_position(&world, child);
        let recovered = world_to_local(&world, world_pos, Some(root));
        assert!((recovered - local).length() < 1e-3);
    }

    #[test]
    fn test_world_angle_reads_matrix_basis() {
        let mut world = World::new();
        let root = world.spawn((Transform::from_position_rotation(
            Vec3::ZERO,
            Quat::from_rotation_z(0.4),
        ),));
        let child = world.spawn((Transform::from_position_rotation(
            Vec3::ZERO,
            Quat::from_rotation_z(0.3),
        ),));
        set_parent(&mut world, child, Some(root));

        propagate_transforms(&mut world);

        assert!((world_angle(&world, root) - 0.4).abs() < 1e-4);
        assert!((world_angle(&world, child) - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_set_world_transform_reproduces_pose() {
        let mut world = World::new();
        let root = world.spawn((Transform::from_position_rotation(
            Vec3::new(30.0, 40.0, 0.0),
            Quat::from_rotation_z(1.1),
        ),));
        let child = world.spawn((Transform::default(),));
        set_parent(&mut world, child, Some(root));

        propagate_transforms(&mut world);

        let target = Vec3::new(-20.0, 8.0, 0.0);
        set_world_transform(&mut world, child, target, Vec3::ONE, Quat::IDENTITY);

        propagate_transforms(&mut world);

        let pos = world_position(&world, child);
        assert!((pos - target).length() < 1e-3);
    }

    #[test]
    fn test_stale_children_are_skipped() {
        let mut world = World::new();
        let root = world.spawn((Transform::default(),));
        let child = world.spawn((Transform::default(),));
        set_parent(&mut world, child, Some(root));

        // Despawn behind the hierarchy's back; the stale entry must not
        // break propagation.
        world.despawn(child).unwrap();
        propagate_transforms(&mut world);

        assert!(world.get::<WorldTransform>(root).is_ok());
    }

    #[test]
    #[should_panic(expected = "no world transform")]
    fn test_world_to_local_requires_propagation() {
        let mut world = World::new();
        let parent = world.spawn((Transform::default(),));
        let _ = world_to_local(&world, Vec3::ZERO, Some(parent));
    }
}
