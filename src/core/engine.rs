//! Core Engine struct and main game loop

use std::time::{Duration, Instant};

use crate::core::debug::FrameStats;
use crate::core::{EventQueue, Scene, Time};
use crate::physics::PhysicsConfig;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Window title
    pub title: String,
    /// Target frames per second (0 for uncapped)
    pub target_fps: u32,
    /// Physics world configuration
    pub physics: PhysicsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("Engine"),
            target_fps: 60,
            physics: PhysicsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set target FPS
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Set the physics configuration
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }
}

/// Game trait that users implement
pub trait Game: 'static {
    /// Called once when the engine starts
    fn init(&mut self, ctx: &mut EngineContext);

    /// Called every frame for game logic updates, before the core systems run
    fn update(&mut self, ctx: &mut EngineContext);

    /// Called when the game is shutting down
    fn shutdown(&mut self, _ctx: &mut EngineContext) {}
}

/// Context passed to game callbacks
pub struct EngineContext {
    /// Time tracking
    pub time: Time,
    /// The live scene
    pub scene: Scene,
    /// Event queue for inter-system communication
    pub events: EventQueue,
    /// Frame statistics
    pub debug: FrameStats,
    /// Should the engine quit
    should_quit: bool,
}

impl EngineContext {
    fn new(physics: PhysicsConfig) -> Self {
        Self {
            time: Time::new(),
            scene: Scene::new(physics),
            events: EventQueue::new(),
            debug: FrameStats::new(),
            should_quit: false,
        }
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Check if engine should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Main engine struct.
///
/// Frames run a fixed order: time update, event-queue swap, game update,
/// then the scene's core systems (physics commit, step, read-back, transform
/// propagation).
pub struct Engine<G: Game> {
    config: EngineConfig,
    game: G,
    context: EngineContext,
}

impl<G: Game> Engine<G> {
    /// Create a new engine with the given game
    pub fn new(config: EngineConfig, game: G) -> Self {
        let context = EngineContext::new(config.physics.clone());
        Self {
            config,
            game,
            context,
        }
    }

    /// Run one frame
    pub fn step(&mut self) {
        let ctx = &mut self.context;
        ctx.time.update();
        ctx.events.swap();
        self.game.update(ctx);
        let dt = ctx.time.delta_seconds();
        ctx.scene.advance(dt, &mut ctx.events);
        ctx.debug.record_frame(ctx.time.delta());
    }

    /// Run the engine until the game requests shutdown
    pub fn run(mut self) {
        env_logger::init();
        log::info!("Starting engine: {}", self.config.title);

        self.game.init(&mut self.context);

        let frame_budget = if self.config.target_fps > 0 {
            Some(Duration::from_secs_f64(1.0 / f64::from(self.config.target_fps)))
        } else {
            None
        };

        loop {
            let frame_start = Instant::now();
            self.step();
            if self.context.should_quit() {
                break;
            }
            if let Some(budget) = frame_budget {
                let spent = frame_start.elapsed();
                if spent < budget {
                    std::thread::sleep(budget - spent);
                }
            }
        }

        self.game.shutdown(&mut self.context);
        log::info!(
            "Engine stopped after {} frames ({})",
            self.context.time.frame_count(),
            self.context.debug.format_stats()
        );
    }
}
