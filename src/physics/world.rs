//! Rigid-body simulation wrapper around rapier2d
//!
//! [`PhysicsWorld`] is the only module that talks to rapier directly. Its
//! surface is meter-native: poses passed in and out are in physics units, and
//! callers convert with [`PIXELS_PER_METER`]. Collider dimensions are the
//! exception: descriptors carry pixel sizes and are converted here, at the
//! same boundary.

use glam::Vec2;
use hecs::Entity;
use rapier2d::prelude::*;
use rustc_hash::FxHashMap;

/// Scale factor between transform/render units (pixels) and physics units
/// (meters). All conversions happen at the physics boundary.
pub const PIXELS_PER_METER: f32 = 32.0;

/// Handle to a rigid body in the physics world.
///
/// Non-owning: the body itself lives in the physics world's arena and must be
/// released with [`PhysicsWorld::destroy_body`]. Handles are generational, so
/// lookups through a destroyed handle return `None` instead of aliasing a
/// reused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) RigidBodyHandle);

/// Rigid body type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Never moves
    Static,
    /// Moved by game logic, pushes dynamic bodies
    Kinematic,
    /// Fully simulated
    Dynamic,
}

/// Rigid body definition, handed to [`PhysicsWorld::create_body`]
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub gravity_scale: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Lock the rotation degree of freedom (platformer characters)
    pub fixed_rotation: bool,
    /// Continuous collision detection for fast movers
    pub ccd_enabled: bool,
}

impl BodyDesc {
    /// A dynamic body affected by gravity and contacts
    pub fn dynamic() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            fixed_rotation: false,
            ccd_enabled: false,
        }
    }

    /// A static body that never moves
    pub fn fixed() -> Self {
        Self {
            body_type: BodyType::Static,
            ..Self::dynamic()
        }
    }

    /// A kinematic body driven by transform updates
    pub fn kinematic() -> Self {
        Self {
            body_type: BodyType::Kinematic,
            ..Self::dynamic()
        }
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd_enabled = enabled;
        self
    }
}

/// Collider shape, dimensions in pixels
#[derive(Debug, Clone, Copy)]
pub enum ColliderShape {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
    CapsuleY { half_height: f32, radius: f32 },
}

/// Collider definition, handed to [`PhysicsWorld::attach_collider`]
#[derive(Debug, Clone)]
pub struct ColliderDesc {
    pub shape: ColliderShape,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Sensors detect contacts but generate no forces
    pub sensor: bool,
}

impl ColliderDesc {
    /// A circular collider with the given radius in pixels
    pub fn ball(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Ball { radius },
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            sensor: false,
        }
    }

    /// A rectangular collider with half-extents in pixels
    pub fn cuboid(half_width: f32, half_height: f32) -> Self {
        Self {
            shape: ColliderShape::Cuboid {
                half_width,
                half_height,
            },
            ..Self::ball(0.0)
        }
    }

    /// A vertical capsule collider with dimensions in pixels
    pub fn capsule_y(half_height: f32, radius: f32) -> Self {
        Self {
            shape: ColliderShape::CapsuleY {
                half_height,
                radius,
            },
            ..Self::ball(0.0)
        }
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }
}

/// Physics world configuration
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity in meters per second squared
    pub gravity: Vec2,
    /// Fixed integration timestep in seconds
    pub fixed_dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            fixed_dt: 1.0 / 60.0,
        }
    }
}

/// Physics world manager
pub struct PhysicsWorld {
    gravity: Vec2,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    body_to_entity: FxHashMap<RigidBodyHandle, Entity>,
    entity_to_body: FxHashMap<Entity, RigidBodyHandle>,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: PhysicsConfig) -> Self {
        let mut params = IntegrationParameters::default();
        params.dt = config.fixed_dt;
        Self {
            gravity: config.gravity,
            pipeline: PhysicsPipeline::new(),
            params,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            body_to_entity: FxHashMap::default(),
            entity_to_body: FxHashMap::default(),
        }
    }

    /// Advance the simulation by one fixed step.
    ///
    /// The frame delta is intentionally ignored: the integrator always runs
    /// with the configured fixed timestep and solver iteration counts, once
    /// per frame. Simulation rate therefore tracks frame rate; decoupling the
    /// two is a known limitation.
    pub fn step(&mut self, _frame_dt: f32) {
        self.pipeline.step(
            self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    /// Create a rigid body at the given pose (meters, radians).
    ///
    /// The body's user-data slot is tagged with the entity handle so that
    /// contact callbacks can find their way back to the entity.
    pub fn create_body(
        &mut self,
        entity: Entity,
        desc: &BodyDesc,
        position: Vec2,
        angle: f32,
    ) -> BodyHandle {
        let mut builder = match desc.body_type {
            BodyType::Static => RigidBodyBuilder::fixed(),
            BodyType::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            BodyType::Dynamic => RigidBodyBuilder::dynamic(),
        };
        builder = builder
            .translation(position)
            .rotation(angle)
            .gravity_scale(desc.gravity_scale)
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .ccd_enabled(desc.ccd_enabled)
            .user_data(u64::from(entity.to_bits()) as u128);
        if desc.fixed_rotation {
            builder = builder.lock_rotations();
        }

        let handle = self.bodies.insert(builder.build());
        self.body_to_entity.insert(handle, entity);
        self.entity_to_body.insert(entity, handle);
        log::debug!("created {:?} body {handle:?} for {entity:?}", desc.body_type);
        BodyHandle(handle)
    }

    /// Attach one collider to a body. Shape dimensions are in pixels and
    /// converted here.
    pub fn attach_collider(&mut self, body: BodyHandle, desc: &ColliderDesc) {
        let builder = match desc.shape {
            ColliderShape::Ball { radius } => ColliderBuilder::ball(radius / PIXELS_PER_METER),
            ColliderShape::Cuboid {
                half_width,
                half_height,
            } => ColliderBuilder::cuboid(
                half_width / PIXELS_PER_METER,
                half_height / PIXELS_PER_METER,
            ),
            ColliderShape::CapsuleY {
                half_height,
                radius,
            } => ColliderBuilder::capsule_y(
                half_height / PIXELS_PER_METER,
                radius / PIXELS_PER_METER,
            ),
        };
        let collider = builder
            .density(desc.density)
            .friction(desc.friction)
            .restitution(desc.restitution)
            .sensor(desc.sensor)
            .build();
        self.colliders
            .insert_with_parent(collider, body.0, &mut self.bodies);
    }

    /// Remove a rigid body and its colliders, invalidating the handle
    pub fn destroy_body(&mut self, body: BodyHandle) {
        if let Some(entity) = self.body_to_entity.remove(&body.0) {
            self.entity_to_body.remove(&entity);
        }
        self.bodies.remove(
            body.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Get a body's position in meters, or `None` if the body is gone
    pub fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.get(body.0).map(|rb| {
            let translation = rb.translation();
            Vec2::new(translation.x, translation.y)
        })
    }

    /// Get a body's rotation angle in radians, or `None` if the body is gone
    pub fn angle(&self, body: BodyHandle) -> Option<f32> {
        self.bodies.get(body.0).map(|rb| rb.rotation().angle())
    }

    /// Teleport a body to the given pose (meters, radians).
    ///
    /// Kinematic bodies get the pose as their next kinematic target so the
    /// solver computes contact velocities; everything else is set directly.
    pub fn set_transform(&mut self, body: BodyHandle, position: Vec2, angle: f32) {
        if let Some(rb) = self.bodies.get_mut(body.0) {
            if rb.is_kinematic() {
                rb.set_next_kinematic_position(Pose::new(position, angle));
            } else {
                rb.set_position(Pose::new(position, angle), true);
            }
        }
    }

    /// Set a body's linear velocity in meters per second
    pub fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.0) {
            rb.set_linvel(velocity, true);
        }
    }

    /// Apply an impulse to a dynamic body
    pub fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body.0) {
            rb.apply_impulse(impulse, true);
        }
    }

    /// Look up the entity a body was created for
    pub fn entity_of_body(&self, body: BodyHandle) -> Option<Entity> {
        self.body_to_entity.get(&body.0).copied()
    }

    /// Look up the body bound to an entity
    pub fn body_of_entity(&self, entity: Entity) -> Option<BodyHandle> {
        self.entity_to_body.get(&entity).copied().map(BodyHandle)
    }

    /// Entity pairs with an active contact after the last step, resolved
    /// through each body's user-data tag
    pub fn active_contacts(&self) -> Vec<(Entity, Entity)> {
        let mut pairs = Vec::new();
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact() {
                continue;
            }
            let a = self.entity_of_collider(pair.collider1);
            let b = self.entity_of_collider(pair.collider2);
            if let (Some(a), Some(b)) = (a, b) {
                pairs.push((a, b));
            }
        }
        pairs
    }

    fn entity_of_collider(&self, collider: ColliderHandle) -> Option<Entity> {
        let parent = self.colliders.get(collider)?.parent()?;
        let body = self.bodies.get(parent)?;
        Entity::from_bits(body.user_data as u64)
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn test_create_and_destroy_body() {
        let mut physics = PhysicsWorld::default();
        let entity = test_entity();

        let body = physics.create_body(entity, &BodyDesc::dynamic(), Vec2::new(1.0, 2.0), 0.0);
        physics.attach_collider(body, &ColliderDesc::ball(16.0));

        assert_eq!(physics.body_count(), 1);
        assert_eq!(physics.entity_of_body(body), Some(entity));
        assert_eq!(physics.body_of_entity(entity), Some(body));

        let pos = physics.position(body).unwrap();
        assert!((pos - Vec2::new(1.0, 2.0)).length() < 1e-5);

        physics.destroy_body(body);
        assert_eq!(physics.body_count(), 0);
        assert!(physics.position(body).is_none());
        assert!(physics.entity_of_body(body).is_none());
    }

    #[test]
    fn test_dynamic_body_falls_under_gravity() {
        let mut physics = PhysicsWorld::default();
        let entity = test_entity();

        let body = physics.create_body(entity, &BodyDesc::dynamic(), Vec2::new(0.0, 10.0), 0.0);
        physics.attach_collider(body, &ColliderDesc::ball(16.0));

        for _ in 0..30 {
            physics.step(1.0 / 60.0);
        }

        let pos = physics.position(body).unwrap();
        assert!(pos.y < 10.0, "body should have fallen, y = {}", pos.y);
    }

    #[test]
    fn test_contacts_resolve_to_entities() {
        let mut physics = PhysicsWorld::default();
        let ground_entity = test_entity();
        let crate_entity = test_entity();

        let ground = physics.create_body(ground_entity, &BodyDesc::fixed(), Vec2::ZERO, 0.0);
        physics.attach_collider(ground, &ColliderDesc::cuboid(320.0, 16.0));

        // Spawned slightly above the ground so it lands within a few steps.
        let crate_body =
            physics.create_body(crate_entity, &BodyDesc::dynamic(), Vec2::new(0.0, 1.2), 0.0);
        physics.attach_collider(crate_body, &ColliderDesc::cuboid(16.0, 16.0));

        for _ in 0..60 {
            physics.step(1.0 / 60.0);
        }

        let contacts = physics.active_contacts();
        assert!(
            contacts.iter().any(|&(a, b)| {
                (a == ground_entity && b == crate_entity)
                    || (a == crate_entity && b == ground_entity)
            }),
            "expected a ground/crate contact, got {contacts:?}"
        );
    }

    #[test]
    fn test_set_transform_moves_body() {
        let mut physics = PhysicsWorld::default();
        let entity = test_entity();

        let body = physics.create_body(entity, &BodyDesc::fixed(), Vec2::ZERO, 0.0);
        physics.set_transform(body, Vec2::new(3.0, 4.0), 0.5);

        let pos = physics.position(body).unwrap();
        assert!((pos - Vec2::new(3.0, 4.0)).length() < 1e-5);
        assert!((physics.angle(body).unwrap() - 0.5).abs() < 1e-5);
    }
}
