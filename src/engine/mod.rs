// Engine modules: renderer, input, assets, frame pacing

pub mod assets;
pub mod game_loop;
pub mod input;
pub mod renderer;
