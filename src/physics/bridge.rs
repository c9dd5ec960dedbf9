//! Transform / physics synchronization
//!
//! Two one-way passes reconcile entity transforms with rigid body poses:
//!
//! - [`sync_transforms_to_physics`] commits world transforms into body poses
//!   for entities whose game logic drives the body (`sync_to_physics`),
//!   gated by a dirty flag so unchanged transforms cause no writes.
//! - [`sync_physics_to_transforms`] reads body poses back into local
//!   transforms for entities the simulation drives (`sync_from_physics`),
//!   converting into the parent's space when the entity is not a root.
//!
//! The bridge never mutates the direction flags; gameplay code picks the
//! authority per entity and the per-frame order in [`update`] (outbound,
//! step, inbound) keeps the two passes from fighting each other.

use glam::{Quat, Vec2, Vec3};
use hecs::Entity;

use crate::core::{EventQueue, GameEvent};
use crate::debug_check;
use crate::ecs::hierarchy::parent_of;
use crate::ecs::{Transform, World, WorldTransform, world_angle, world_to_local};
use crate::physics::world::{
    BodyDesc, BodyHandle, BodyType, ColliderDesc, PIXELS_PER_METER, PhysicsWorld,
};

/// Binds an entity to a rigid body in the physics world.
///
/// The handle is non-owning; the body is released through the scene's
/// destruction hook when the entity dies. Direction flags select which side
/// is authoritative for the entity's pose; the dirty flag marks a transform
/// change that has not been committed to the body yet.
#[derive(Debug, Clone)]
pub struct RigidBodyBinding {
    /// Bound body, or `None` when the binding is inert
    pub body: Option<BodyHandle>,
    /// Whether the body is kinematic (derived from the body definition)
    pub kinematic: bool,
    /// Copy body pose into the local transform after each step
    pub sync_from_physics: bool,
    /// Commit the world transform into the body pose before each step
    pub sync_to_physics: bool,
    transform_dirty: bool,
}

impl RigidBodyBinding {
    fn new(body: BodyHandle, body_type: BodyType) -> Self {
        let kinematic = body_type == BodyType::Kinematic;
        Self {
            body: Some(body),
            kinematic,
            sync_from_physics: body_type == BodyType::Dynamic,
            sync_to_physics: body_type != BodyType::Dynamic,
            // Never committed yet; the first outbound pass aligns the body
            // with the propagated transform.
            transform_dirty: true,
        }
    }

    /// Mark the transform as changed since the last physics commit.
    ///
    /// The scene facade does this automatically for its transform setters;
    /// code mutating `Transform` components directly must call it by hand or
    /// the change is skipped by the outbound sync.
    pub fn mark_dirty(&mut self) {
        self.transform_dirty = true;
    }

    /// Whether a transform change is waiting to be committed
    pub fn is_dirty(&self) -> bool {
        self.transform_dirty
    }
}

/// Create a rigid body for an entity and bind them together.
///
/// The body spawns at the entity's current world pose (falling back to the
/// local transform when no propagation has run yet), converted to meters.
/// One collider is attached from `collider_desc`. The binding's direction
/// flags default to the body type's natural authority: dynamic bodies drive
/// the transform, kinematic and static bodies are driven by it.
pub fn create_physics_body(
    world: &mut World,
    physics: &mut PhysicsWorld,
    entity: Entity,
    body_desc: &BodyDesc,
    collider_desc: &ColliderDesc,
) -> Option<BodyHandle> {
    if !debug_check!(
        world.is_alive(entity),
        "create_physics_body: {:?} is not alive",
        entity
    ) {
        return None;
    }

    let (position, angle) = match world.cloned::<WorldTransform>(entity) {
        Some(world_transform) => (world_transform.position(), world_transform.angle()),
        None => {
            let local = world.cloned::<Transform>(entity).unwrap_or_default();
            (local.position, local.rotation_z())
        }
    };
    let position_m = Vec2::new(position.x, position.y) / PIXELS_PER_METER;

    let body = physics.create_body(entity, body_desc, position_m, angle);
    physics.attach_collider(body, collider_desc);

    let _ = world.insert(entity, RigidBodyBinding::new(body, body_desc.body_type));
    Some(body)
}

/// Commit changed world transforms into their bodies' poses.
///
/// Acts only on entities whose binding has a live body, `sync_to_physics`
/// set, and a pending dirty flag; each qualifying entity gets exactly one
/// `set_transform` and its dirty flag cleared.
pub fn sync_transforms_to_physics(world: &mut World, physics: &mut PhysicsWorld) {
    let mut commits: Vec<(Entity, BodyHandle, Vec2, f32)> = Vec::new();
    for (entity, (binding, _local, world_transform)) in world
        .query::<(&RigidBodyBinding, &Transform, &WorldTransform)>()
        .iter()
    {
        let Some(body) = binding.body else {
            continue;
        };
        if !binding.sync_to_physics || !binding.is_dirty() {
            continue;
        }
        let translation = world_transform.position();
        let position_m = Vec2::new(translation.x, translation.y) / PIXELS_PER_METER;
        commits.push((entity, body, position_m, world_transform.angle()));
    }

    for (entity, body, position, angle) in commits {
        physics.set_transform(body, position, angle);
        if let Ok(mut binding) = world.get_mut::<RigidBodyBinding>(entity) {
            binding.transform_dirty = false;
        }
    }
}

/// Read body poses back into the local transforms of simulation-driven
/// entities.
///
/// Parented entities get the pose converted into the parent's local space
/// (position through the parent's inverse world matrix, angle relative to
/// the parent's world angle); roots take it verbatim. Only x/y and the
/// z-rotation are written: the z position is a layering value the physics
/// world knows nothing about.
pub fn sync_physics_to_transforms(world: &mut World, physics: &PhysicsWorld) {
    let mut poses: Vec<(Entity, Vec2, f32)> = Vec::new();
    for (entity, (binding, _local)) in world.query::<(&RigidBodyBinding, &Transform)>().iter() {
        let Some(body) = binding.body else {
            continue;
        };
        if !binding.sync_from_physics {
            continue;
        }
        let (Some(position), Some(angle)) = (physics.position(body), physics.angle(body)) else {
            continue;
        };
        poses.push((entity, position * PIXELS_PER_METER, angle));
    }

    for (entity, world_pos, world_rot) in poses {
        let parent = parent_of(world, entity);
        let (local_pos, local_rot) = match parent {
            Some(parent_entity) => {
                let converted = world_to_local(
                    world,
                    Vec3::new(world_pos.x, world_pos.y, 0.0),
                    Some(parent_entity),
                );
                let parent_angle = world_angle(world, parent_entity);
                (Vec2::new(converted.x, converted.y), world_rot - parent_angle)
            }
            None => (world_pos, world_rot),
        };
        if let Ok(mut local) = world.get_mut::<Transform>(entity) {
            local.position.x = local_pos.x;
            local.position.y = local_pos.y;
            local.rotation = Quat::from_rotation_z(local_rot);
        }
    }
}

/// Per-frame physics orchestration: outbound commit, fixed step, inbound
/// read-back, then contact pairs drained into the event queue.
pub fn update(world: &mut World, physics: &mut PhysicsWorld, dt: f32, events: &mut EventQueue) {
    sync_transforms_to_physics(world, physics);
    physics.step(dt);
    sync_physics_to_transforms(world, physics);

    for (entity_a, entity_b) in physics.active_contacts() {
        events.push(GameEvent::Collision { entity_a, entity_b });
    }
}
