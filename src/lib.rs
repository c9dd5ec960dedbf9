//! A 2D Game Engine core built in Rust
//!
//! This engine provides:
//! - Entity Component System (ECS) architecture with parent/child hierarchies
//! - World transform propagation over the scene graph
//! - Physics simulation with rapier2d, synchronized with entity transforms
//! - Scene snapshots in RON or JSON

pub mod core;
pub mod ecs;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier2d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{
        Engine, EngineConfig, EngineContext, EventQueue, FrameStats, Game, GameEvent, Scene,
        SceneSnapshot, Time,
    };
    pub use crate::ecs::{
        Children, Name, Parent, Transform, World, WorldTransform, propagate_transforms,
        remove_from_parent, set_parent, set_world_transform, world_angle, world_to_local,
    };
    pub use crate::physics::{
        BodyDesc, BodyHandle, BodyType, ColliderDesc, ColliderShape, PIXELS_PER_METER,
        PhysicsConfig, PhysicsWorld, RigidBodyBinding,
    };
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
    pub use hecs::Entity;
}
