//! Live scene: game-object lifecycle and per-frame system order
//!
//! [`Scene`] owns the ECS world and the physics world and is the surface
//! gameplay code talks to. It keeps the parent/child invariant intact across
//! reparenting and destruction, runs the registered destruction hooks, and
//! drives the fixed per-frame order:
//!
//! 1. gameplay mutations (outside, before `advance`)
//! 2. transform to physics commit
//! 3. physics step
//! 4. physics to transform read-back
//! 5. world transform propagation

use glam::{Quat, Vec3};
use hecs::Entity;

use crate::core::{EventQueue, GameEvent};
use crate::debug_check;
use crate::ecs::hierarchy::{children_of, parent_of};
use crate::ecs::{Parent, Transform, World, hierarchy, propagate_transforms, transform};
use crate::physics::{
    BodyDesc, BodyHandle, ColliderDesc, PhysicsConfig, PhysicsWorld, RigidBodyBinding, bridge,
};

/// Cleanup callback run for each entity just before it is despawned.
///
/// Hooks run synchronously, in registration order, for every entity a
/// destruction cascade removes.
pub type DespawnHook = fn(&mut World, &mut PhysicsWorld, Entity);

/// The live scene: entities, their components, and the physics simulation.
pub struct Scene {
    /// Entity and component storage
    pub world: World,
    /// Rigid-body simulation
    pub physics: PhysicsWorld,
    despawn_hooks: Vec<DespawnHook>,
    destroyed: Vec<GameEvent>,
}

impl Scene {
    /// Create an empty scene.
    ///
    /// Destruction hooks are registered here, in the order they must run:
    /// first the hierarchy hook (strips `Parent` from surviving children),
    /// then the physics hook (returns the bound body to the physics world).
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            world: World::new(),
            physics: PhysicsWorld::new(config),
            despawn_hooks: vec![detach_children_hook, release_body_hook],
            destroyed: Vec::new(),
        }
    }

    /// Spawn a game object with a default local transform, optionally under
    /// a parent.
    pub fn create_game_object(&mut self, parent: Option<Entity>) -> Entity {
        let entity = self.world.spawn((Transform::default(),));
        if parent.is_some() {
            hierarchy::set_parent(&mut self.world, entity, parent);
        }
        entity
    }

    /// Destroy a game object and every descendant.
    ///
    /// The entity is first detached from its parent's child list, then its
    /// subtree is destroyed depth-first, children in reverse insertion order,
    /// each entity's despawn hooks running just before its handle dies.
    pub fn destroy_game_object(&mut self, entity: Entity) {
        if !debug_check!(
            self.world.is_alive(entity),
            "destroy_game_object: {:?} is not alive",
            entity
        ) {
            return;
        }
        if let Some(parent) = parent_of(&self.world, entity) {
            hierarchy::remove_from_parent(&mut self.world, parent, entity);
        }
        self.destroy_recursive(entity);
    }

    fn destroy_recursive(&mut self, entity: Entity) {
        let children = children_of(&self.world, entity);
        for child in children.into_iter().rev() {
            if self.world.is_alive(child) {
                self.destroy_recursive(child);
            }
        }
        for hook in &self.despawn_hooks {
            hook(&mut self.world, &mut self.physics, entity);
        }
        self.destroyed.push(GameEvent::EntityDestroyed { entity });
        let _ = self.world.despawn(entity);
    }

    /// Reparent an entity; `None` makes it a root.
    ///
    /// The local transform is left as-is, so the entity's world pose jumps
    /// unless the caller compensates with [`Scene::set_world_transform`].
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) {
        hierarchy::set_parent(&mut self.world, child, parent);
    }

    /// Remove `child` from `parent`'s child list (tolerant)
    pub fn remove_from_parent(&mut self, parent: Entity, child: Entity) {
        hierarchy::remove_from_parent(&mut self.world, parent, child);
    }

    /// Set an entity's local transform and mark any physics binding dirty so
    /// the change is committed on the next frame.
    pub fn set_local_transform(
        &mut self,
        entity: Entity,
        position: Vec3,
        scale: Vec3,
        rotation: Quat,
    ) {
        if !debug_check!(
            self.world.is_alive(entity),
            "set_local_transform: {:?} is not alive",
            entity
        ) {
            return;
        }
        let _ = self.world.insert(
            entity,
            Transform {
                position,
                rotation,
                scale,
            },
        );
        self.mark_binding_dirty(entity);
    }

    /// Set an entity's world-space pose by computing the equivalent local
    /// transform, and mark any physics binding dirty.
    pub fn set_world_transform(
        &mut self,
        entity: Entity,
        position: Vec3,
        scale: Vec3,
        rotation: Quat,
    ) {
        transform::set_world_transform(&mut self.world, entity, position, scale, rotation);
        self.mark_binding_dirty(entity);
    }

    /// Create a rigid body for an entity and bind them together
    pub fn create_physics_body(
        &mut self,
        entity: Entity,
        body_desc: &BodyDesc,
        collider_desc: &ColliderDesc,
    ) -> Option<BodyHandle> {
        bridge::create_physics_body(
            &mut self.world,
            &mut self.physics,
            entity,
            body_desc,
            collider_desc,
        )
    }

    /// Run one frame of the core systems in their fixed order
    pub fn advance(&mut self, dt: f32, events: &mut EventQueue) {
        for event in self.destroyed.drain(..) {
            events.push(event);
        }
        bridge::update(&mut self.world, &mut self.physics, dt, events);
        propagate_transforms(&mut self.world);
    }

    fn mark_binding_dirty(&mut self, entity: Entity) {
        if let Ok(mut binding) = self.world.get_mut::<RigidBodyBinding>(entity) {
            binding.mark_dirty();
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

/// Despawn hook: strip `Parent` from any still live children of the dying
/// entity.
///
/// The recursive cascade normally destroys the whole subtree first, so this
/// only matters for destruction paths that bypass it; it keeps those from
/// leaving children pointing at a dead parent.
fn detach_children_hook(world: &mut World, _physics: &mut PhysicsWorld, entity: Entity) {
    let children = children_of(world, entity);
    for child in children {
        if world.is_alive(child) {
            world.remove::<Parent>(child);
        }
    }
}

/// Despawn hook: return the bound rigid body to the physics world and clear
/// the binding before the entity handle is invalidated.
fn release_body_hook(world: &mut World, physics: &mut PhysicsWorld, entity: Entity) {
    if let Ok(mut binding) = world.get_mut::<RigidBodyBinding>(entity) {
        if let Some(body) = binding.body.take() {
            physics.destroy_body(body);
        }
    }
}
