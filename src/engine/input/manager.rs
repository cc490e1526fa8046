// Input manager - Main coordination system for all input

use super::action::{Action, InputSource};
use super::config::InputConfigManager;
use super::player::{ControlIntent, PlayerInput};
use log::warn;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Main input manager that coordinates all input for all players
pub struct InputManager {
    /// Configuration manager for all players
    config: InputConfigManager,

    /// Input state for each player
    players: Vec<PlayerInput>,
}

impl InputManager {
    /// Create a new input manager
    pub fn new(max_players: usize) -> Self {
        Self {
            config: InputConfigManager::new(max_players),
            players: (0..max_players).map(PlayerInput::new).collect(),
        }
    }

    /// Process a keyboard event from winit. Returns a global action (such as
    /// quitting) when one was pressed.
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) -> Option<Action> {
        match event.physical_key {
            PhysicalKey::Code(key_code) => self.process_key(key_code, event.state, event.repeat),
            PhysicalKey::Unidentified(_) => None,
        }
    }

    /// Apply one key transition to every player bound to it
    pub fn process_key(&mut self, key_code: KeyCode, state: ElementState, repeat: bool) -> Option<Action> {
        let source = InputSource::key(key_code);

        if let Some(action) = self.config.get_global_action(source) {
            return (state == ElementState::Pressed && !repeat).then_some(action);
        }

        for player in &mut self.players {
            if let Some(action) = self.config.get_action(player.player_id(), source) {
                match state {
                    ElementState::Pressed => player.press(action),
                    ElementState::Released => player.release(action),
                }
            }
        }

        None
    }

    /// Held controls of every player, by player index
    pub fn intents(&self) -> Vec<ControlIntent> {
        self.players.iter().map(PlayerInput::intent).collect()
    }

    /// Override some of a player's keys. Keys the player was holding are
    /// released. Logs a warning for each action left without a key.
    pub fn remap(&mut self, player_id: usize, bindings: &[(InputSource, Action)]) {
        let Some(unbound) = self.config.remap(player_id, bindings) else {
            warn!("Ignoring key bindings for unknown player {}", player_id + 1);
            return;
        };

        if let Some(player) = self.players.get_mut(player_id) {
            player.reset();
        }
        for action in unbound {
            warn!("Player {} has no key for {:?}", player_id + 1, action);
        }
    }

    /// Clear per-update press edges for every player
    pub fn update(&mut self) {
        for player in &mut self.players {
            player.update();
        }
    }

    /// Release every held key, e.g. when the window loses focus
    pub fn reset_all(&mut self) {
        for player in &mut self.players {
            player.reset();
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(2)
    }
}
