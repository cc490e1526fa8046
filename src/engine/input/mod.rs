// Input handling system
//
// Maps keyboard events to per-player held controls, with remappable bindings.
//
// ## Architecture
//
// - `action`: Defines game actions and default key bindings
// - `player`: Per-player held-key state and the resulting intent
// - `config`: Per-player key bindings and startup overrides
// - `manager`: Main input manager coordinating everything
//
// ## Usage Example
//
// ```rust
// use engine::input::{parse_bindings, Action, InputManager};
//
// let mut input_manager = InputManager::new(2);
// input_manager.remap(0, &parse_bindings("left=J,right=L,punch=K")?);
//
// // In your event loop, process keyboard events
// if input_manager.process_keyboard_event(&key_event) == Some(Action::Quit) {
//     // leave the event loop
// }
//
// // Each update, hand the held controls to the game
// game.step(&input_manager.intents());
// ```

pub mod action;
pub mod config;
pub mod manager;
pub mod player;

// Re-export commonly used types
pub use action::{parse_bindings, Action, BindingError, InputSource};
pub use manager::InputManager;
pub use player::ControlIntent;
