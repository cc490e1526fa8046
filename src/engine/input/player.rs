// Per-player input state management

use super::action::Action;
use std::collections::HashSet;

/// What a player asks their robot to do this update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlIntent {
    pub left: bool,
    pub right: bool,
    pub punch: bool,
    /// Left went down since the last update
    pub left_pressed: bool,
    /// Right went down since the last update
    pub right_pressed: bool,
}

/// Represents the input state for a single player
#[derive(Debug)]
pub struct PlayerInput {
    /// Player ID
    player_id: usize,

    /// Actions that are currently held
    pressed: HashSet<Action>,

    /// Actions that went down since the last update
    just_pressed: HashSet<Action>,
}

impl PlayerInput {
    /// Create a new player input state
    pub fn new(player_id: usize) -> Self {
        Self {
            player_id,
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
        }
    }

    /// Get the player ID
    pub fn player_id(&self) -> usize {
        self.player_id
    }

    /// Check if an action is currently pressed
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Check if an action went down since the last update
    pub fn is_just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Register an action press. Key repeat does not count as a new press.
    pub(crate) fn press(&mut self, action: Action) {
        if self.pressed.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Register an action release
    pub(crate) fn release(&mut self, action: Action) {
        self.pressed.remove(&action);
    }

    /// Clear per-update edges (call after each fixed update)
    pub fn update(&mut self) {
        self.just_pressed.clear();
    }

    /// Reset all input state
    pub fn reset(&mut self) {
        self.pressed.clear();
        self.just_pressed.clear();
    }

    /// Held controls as an intent
    pub fn intent(&self) -> ControlIntent {
        ControlIntent {
            left: self.is_pressed(Action::MoveLeft),
            right: self.is_pressed(Action::MoveRight),
            punch: self.is_pressed(Action::Punch),
            left_pressed: self.is_just_pressed(Action::MoveLeft),
            right_pressed: self.is_just_pressed(Action::MoveRight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_input_creation() {
        let input = PlayerInput::new(1);
        assert_eq!(input.player_id(), 1);
        assert_eq!(input.intent(), ControlIntent::default());
    }

    #[test]
    fn test_press_and_release() {
        let mut input = PlayerInput::new(0);
        input.press(Action::Punch);
        assert!(input.is_pressed(Action::Punch));

        input.release(Action::Punch);
        assert!(!input.is_pressed(Action::Punch));
    }

    #[test]
    fn test_intent_reflects_held_keys() {
        let mut input = PlayerInput::new(0);
        input.press(Action::MoveLeft);
        input.press(Action::MoveRight);
        input.press(Action::Punch);

        assert_eq!(
            input.intent(),
            ControlIntent {
                left: true,
                right: true,
                punch: true,
                left_pressed: true,
                right_pressed: true,
            }
        );
    }

    #[test]
    fn test_update_clears_edges_but_keeps_held() {
        let mut input = PlayerInput::new(0);
        input.press(Action::MoveLeft);
        assert!(input.is_just_pressed(Action::MoveLeft));

        input.update();
        assert!(!input.is_just_pressed(Action::MoveLeft));
        assert!(input.is_pressed(Action::MoveLeft));
        assert!(!input.intent().left_pressed);
    }

    #[test]
    fn test_repeat_press_is_not_an_edge() {
        let mut input = PlayerInput::new(0);
        input.press(Action::MoveRight);
        input.update();
        input.press(Action::MoveRight);
        assert!(!input.is_just_pressed(Action::MoveRight));

        input.release(Action::MoveRight);
        input.press(Action::MoveRight);
        assert!(input.is_just_pressed(Action::MoveRight));
    }

    #[test]
    fn test_reset() {
        let mut input = PlayerInput::new(0);
        input.press(Action::MoveRight);
        input.reset();
        assert_eq!(input.intent(), ControlIntent::default());
    }

    #[test]
    fn test_release_unpressed_action() {
        let mut input = PlayerInput::new(0);
        input.release(Action::MoveLeft);
        assert!(!input.is_pressed(Action::MoveLeft));
    }
}
