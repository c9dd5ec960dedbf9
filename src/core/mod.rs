//! Core engine module
//!
//! Contains the main Engine struct, the live Scene, and frame plumbing

mod debug;
mod engine;
mod events;
mod scene;
mod snapshot;
mod time;

pub use debug::FrameStats;
pub use engine::{Engine, EngineConfig, EngineContext, Game};
pub use events::{EventQueue, GameEvent};
pub use scene::{DespawnHook, Scene};
pub use snapshot::{GameObjectSnapshot, SceneError, SceneSnapshot};
pub use time::Time;
