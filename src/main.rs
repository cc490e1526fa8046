use anyhow::Result;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

mod config;
mod core;
mod engine;
mod game;

use config::AppConfig;
use engine::assets::AssetLoader;
use engine::game_loop::GameLoop;
use engine::input::{Action, InputManager};
use engine::renderer::Renderer;
use game::{Game, SceneResources};

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting Robot Brawl...");

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_resizable(true)
            .build(&event_loop)?,
    );

    info!("Window created successfully");

    let requested = LogicalSize::new(config.width, config.height).to_physical(window.scale_factor());
    let mut renderer = pollster::block_on(Renderer::new(window.clone(), requested))?;
    let assets = AssetLoader::new(&config.asset_dir);
    info!("Loading assets from {:?}", assets.base_path());

    let resources = SceneResources::load(&mut renderer, &assets);
    let mut game = Game::new(&resources, StdRng::from_entropy());
    let mut input = InputManager::default();
    for (player_id, bindings) in &config.controls {
        info!("Applying {} key override(s) for player {}", bindings.len(), player_id + 1);
        input.remap(*player_id, bindings);
    }
    let mut game_loop = GameLoop::new();

    // Main event loop
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    info!("Close requested, shutting down...");
                    elwt.exit();
                }
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(physical_size);
                }
                WindowEvent::Focused(false) => {
                    // Keys released while unfocused never reach us
                    input.reset_all();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    match input.process_keyboard_event(&event) {
                        Some(Action::Quit) => {
                            info!("Quit requested, shutting down...");
                            elwt.exit();
                        }
                        Some(Action::ToggleHitboxes) => game.toggle_hitboxes(),
                        _ => {}
                    }
                }
                WindowEvent::RedrawRequested => {
                    for _ in 0..game_loop.begin_frame() {
                        game.step(&input.intents());
                        input.update();
                    }

                    if let Err(e) = renderer.render(&game.draw(renderer.view())) {
                        error!("Render failed: {e:#}");
                        elwt.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                // Request redraw on next frame
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
