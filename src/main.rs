//! Example game demonstrating engine features

use engine2d::prelude::*;

/// Demo with a falling crate, a scripted platform, and a child sprite anchor
struct DemoGame {
    crate_box: Option<Entity>,
    platform: Option<Entity>,
    frames: u32,
}

impl DemoGame {
    fn new() -> Self {
        Self {
            crate_box: None,
            platform: None,
            frames: 0,
        }
    }
}

impl Game for DemoGame {
    fn init(&mut self, ctx: &mut EngineContext) {
        log::info!("Initializing demo game");

        // Static ground spanning the bottom of the playfield.
        let ground = ctx.scene.create_game_object(None);
        ctx.scene
            .set_local_transform(ground, Vec3::new(0.0, -200.0, 0.0), Vec3::ONE, Quat::IDENTITY);
        ctx.scene
            .create_physics_body(ground, &BodyDesc::fixed(), &ColliderDesc::cuboid(400.0, 16.0));

        // Simulated crate dropping onto the ground, with a child anchor the
        // renderer would hang a sprite from.
        let crate_box = ctx.scene.create_game_object(None);
        ctx.scene
            .set_local_transform(crate_box, Vec3::new(0.0, 300.0, 0.0), Vec3::ONE, Quat::IDENTITY);
        ctx.scene.create_physics_body(
            crate_box,
            &BodyDesc::dynamic(),
            &ColliderDesc::cuboid(16.0, 16.0).with_restitution(0.2),
        );
        let anchor = ctx.scene.create_game_object(Some(crate_box));
        ctx.scene
            .set_local_transform(anchor, Vec3::new(8.0, 8.0, 1.0), Vec3::ONE, Quat::IDENTITY);

        // Scripted platform swept back and forth by game logic.
        let platform = ctx.scene.create_game_object(None);
        ctx.scene
            .set_local_transform(platform, Vec3::new(200.0, -100.0, 0.0), Vec3::ONE, Quat::IDENTITY);
        ctx.scene.create_physics_body(
            platform,
            &BodyDesc::kinematic(),
            &ColliderDesc::cuboid(48.0, 8.0),
        );

        self.crate_box = Some(crate_box);
        self.platform = Some(platform);
        log::info!("Demo game initialized");
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        self.frames += 1;

        // Sweep the platform; the transform edit is committed to its
        // kinematic body on this frame's physics pass.
        if let Some(platform) = self.platform {
            let x = 200.0 + 80.0 * (self.frames as f32 * 0.02).sin();
            ctx.scene
                .set_local_transform(platform, Vec3::new(x, -100.0, 0.0), Vec3::ONE, Quat::IDENTITY);
        }

        for event in ctx.events.iter() {
            if let GameEvent::Collision { entity_a, entity_b } = event {
                log::debug!("contact: {entity_a:?} <-> {entity_b:?}");
            }
        }

        if self.frames % 60 == 0 {
            if let Some(crate_box) = self.crate_box {
                if let Ok(world_transform) = ctx.scene.world.get::<WorldTransform>(crate_box) {
                    let pos = world_transform.position();
                    log::info!("crate at ({:.1}, {:.1})", pos.x, pos.y);
                }
            }
        }

        if self.frames >= 600 {
            ctx.quit();
        }
    }

    fn shutdown(&mut self, ctx: &mut EngineContext) {
        log::info!("Shutting down with {} entities", ctx.scene.world.len());
    }
}

fn main() {
    let config = EngineConfig::default()
        .with_title("Engine Demo")
        .with_target_fps(60);

    let engine = Engine::new(config, DemoGame::new());
    engine.run();
}
