// Key bindings per player, with overrides applied at startup

use super::action::{default_bindings, global_bindings, Action, InputSource};
use std::collections::HashMap;

/// Player actions every control set needs a key for
pub const PLAYER_ACTIONS: [Action; 3] = [Action::MoveLeft, Action::MoveRight, Action::Punch];

/// Maps input sources (keys) to game actions for one player
#[derive(Debug, Clone, Default)]
pub struct InputConfig {
    bindings: HashMap<InputSource, Action>,
}

impl InputConfig {
    /// Create a configuration from a list of bindings
    pub fn from_bindings(bindings: Vec<(InputSource, Action)>) -> Self {
        let mut config = Self::default();
        for (source, action) in bindings {
            config.bind(source, action);
        }
        config
    }

    /// Bind `source` to `action`. The action's previous key and the
    /// source's previous action are both dropped.
    pub fn bind(&mut self, source: InputSource, action: Action) {
        self.bindings.retain(|_, bound| *bound != action);
        self.bindings.insert(source, action);
    }

    /// Get the action bound to an input source
    pub fn get_action(&self, source: InputSource) -> Option<Action> {
        self.bindings.get(&source).copied()
    }

    /// Check if an action has any bindings
    pub fn has_binding(&self, action: Action) -> bool {
        self.bindings.values().any(|bound| *bound == action)
    }
}

/// Bindings for every player plus the global table
#[derive(Debug)]
pub struct InputConfigManager {
    configs: Vec<InputConfig>,

    /// Global bindings (not player-specific)
    global_config: InputConfig,
}

impl InputConfigManager {
    /// Create a new config manager with default configurations
    pub fn new(max_players: usize) -> Self {
        let configs = (0..max_players)
            .map(|player_id| InputConfig::from_bindings(default_bindings(player_id)))
            .collect();

        Self {
            configs,
            global_config: InputConfig::from_bindings(global_bindings()),
        }
    }

    /// Apply `bindings` on top of a player's current keys. Returns the
    /// player actions left without a key, or `None` for an unknown player.
    pub fn remap(
        &mut self,
        player_id: usize,
        bindings: &[(InputSource, Action)],
    ) -> Option<Vec<Action>> {
        let config = self.configs.get_mut(player_id)?;
        for &(source, action) in bindings {
            config.bind(source, action);
        }

        Some(
            PLAYER_ACTIONS
                .into_iter()
                .filter(|action| !config.has_binding(*action))
                .collect(),
        )
    }

    /// Get the player-specific action for a given input source
    pub fn get_action(&self, player_id: usize, source: InputSource) -> Option<Action> {
        self.configs.get(player_id)?.get_action(source)
    }

    /// Get the global action for a given input source
    pub fn get_global_action(&self, source: InputSource) -> Option<Action> {
        self.global_config.get_action(source)
    }
}

impl Default for InputConfigManager {
    fn default() -> Self {
        Self::new(2)
    }
}
