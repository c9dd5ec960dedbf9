//! Entity Component System module
//!
//! Built on top of the hecs ECS library

mod components;
pub mod hierarchy;
pub mod transform;
mod world;

pub use components::{Name, Transform};
pub use hierarchy::{Children, Parent, remove_from_parent, set_parent};
pub use transform::{
    WorldTransform, propagate_transforms, set_world_transform, world_angle, world_to_local,
};
pub use world::World;
