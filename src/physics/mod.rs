//! Physics simulation module
//!
//! Built on top of rapier2d

pub mod bridge;
mod world;

pub use bridge::{RigidBodyBinding, create_physics_body};
pub use world::{
    BodyDesc, BodyHandle, BodyType, ColliderDesc, ColliderShape, PIXELS_PER_METER, PhysicsConfig,
    PhysicsWorld,
};
