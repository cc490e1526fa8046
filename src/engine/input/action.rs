// Game action definitions and mappings

use winit::keyboard::KeyCode;

/// Represents all possible in-game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Movement
    MoveLeft,
    MoveRight,

    // Attack
    Punch,

    // Meta actions
    Quit,
    ToggleHitboxes,
}

impl Action {
    /// Parse a player action from its config name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Self::MoveLeft),
            "right" => Some(Self::MoveRight),
            "punch" => Some(Self::Punch),
            _ => None,
        }
    }
}

/// Represents an input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyCode),
}

impl InputSource {
    /// Create a keyboard input source
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }
}

/// Errors from parsing a key binding list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("expected `action=key`, got {0:?}")]
    Malformed(String),

    #[error("unknown action {0:?} (expected left, right or punch)")]
    UnknownAction(String),

    #[error("unknown key {0:?}")]
    UnknownKey(String),
}

/// Parse a binding list such as `left=J, right=L, punch=K`
pub fn parse_bindings(list: &str) -> Result<Vec<(InputSource, Action)>, BindingError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (action, key) = entry
                .split_once('=')
                .ok_or_else(|| BindingError::Malformed(entry.to_string()))?;
            let (action, key) = (action.trim(), key.trim());
            let action = Action::from_name(&action.to_ascii_lowercase())
                .ok_or_else(|| BindingError::UnknownAction(action.to_string()))?;
            let key = key_from_name(key).ok_or_else(|| BindingError::UnknownKey(key.to_string()))?;
            Ok((InputSource::key(key), action))
        })
        .collect()
}

/// Convert a key name back to a KeyCode
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA,
        KeyCode::KeyB,
        KeyCode::KeyC,
        KeyCode::KeyD,
        KeyCode::KeyE,
        KeyCode::KeyF,
        KeyCode::KeyG,
        KeyCode::KeyH,
        KeyCode::KeyI,
        KeyCode::KeyJ,
        KeyCode::KeyK,
        KeyCode::KeyL,
        KeyCode::KeyM,
        KeyCode::KeyN,
        KeyCode::KeyO,
        KeyCode::KeyP,
        KeyCode::KeyQ,
        KeyCode::KeyR,
        KeyCode::KeyS,
        KeyCode::KeyT,
        KeyCode::KeyU,
        KeyCode::KeyV,
        KeyCode::KeyW,
        KeyCode::KeyX,
        KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0,
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];

    if let [byte] = name.as_bytes() {
        return match byte {
            b'a'..=b'z' => Some(LETTERS[(byte - b'a') as usize]),
            b'A'..=b'Z' => Some(LETTERS[(byte - b'A') as usize]),
            b'0'..=b'9' => Some(DIGITS[(byte - b'0') as usize]),
            _ => None,
        };
    }

    match name {
        // Arrow keys
        "ArrowUp" | "Up" => Some(KeyCode::ArrowUp),
        "ArrowDown" | "Down" => Some(KeyCode::ArrowDown),
        "ArrowLeft" | "Left" => Some(KeyCode::ArrowLeft),
        "ArrowRight" | "Right" => Some(KeyCode::ArrowRight),

        // Modifiers
        "ShiftLeft" => Some(KeyCode::ShiftLeft),
        "ShiftRight" => Some(KeyCode::ShiftRight),
        "ControlLeft" => Some(KeyCode::ControlLeft),
        "ControlRight" => Some(KeyCode::ControlRight),
        "AltLeft" => Some(KeyCode::AltLeft),
        "AltRight" => Some(KeyCode::AltRight),

        // Special keys
        "Space" => Some(KeyCode::Space),
        "Enter" => Some(KeyCode::Enter),
        "Tab" => Some(KeyCode::Tab),
        "Comma" => Some(KeyCode::Comma),
        "Period" => Some(KeyCode::Period),
        "Slash" => Some(KeyCode::Slash),
        "Semicolon" => Some(KeyCode::Semicolon),

        // Numpad
        "Numpad0" => Some(KeyCode::Numpad0),
        "Numpad1" => Some(KeyCode::Numpad1),
        "Numpad2" => Some(KeyCode::Numpad2),
        "Numpad3" => Some(KeyCode::Numpad3),
        "Numpad4" => Some(KeyCode::Numpad4),
        "Numpad5" => Some(KeyCode::Numpad5),
        "Numpad6" => Some(KeyCode::Numpad6),
        "Numpad7" => Some(KeyCode::Numpad7),
        "Numpad8" => Some(KeyCode::Numpad8),
        "Numpad9" => Some(KeyCode::Numpad9),
        "NumpadEnter" => Some(KeyCode::NumpadEnter),

        _ => None,
    }
}

/// Default keyboard bindings for Player 1
pub fn default_p1_bindings() -> Vec<(InputSource, Action)> {
    vec![
        (InputSource::key(KeyCode::KeyA), Action::MoveLeft),
        (InputSource::key(KeyCode::KeyD), Action::MoveRight),
        (InputSource::key(KeyCode::KeyS), Action::Punch),
    ]
}

/// Default keyboard bindings for Player 2
pub fn default_p2_bindings() -> Vec<(InputSource, Action)> {
    vec![
        (InputSource::key(KeyCode::ArrowLeft), Action::MoveLeft),
        (InputSource::key(KeyCode::ArrowRight), Action::MoveRight),
        (InputSource::key(KeyCode::ArrowDown), Action::Punch),
    ]
}

/// Default bindings for a player slot
pub fn default_bindings(player_id: usize) -> Vec<(InputSource, Action)> {
    match player_id {
        0 => default_p1_bindings(),
        1 => default_p2_bindings(),
        _ => Vec::new(),
    }
}

/// Global bindings (not player-specific)
pub fn global_bindings() -> Vec<(InputSource, Action)> {
    vec![
        (InputSource::key(KeyCode::Escape), Action::Quit),
        (InputSource::key(KeyCode::F1), Action::ToggleHitboxes),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_input_source_keyboard_creation() {
        let source = InputSource::key(KeyCode::KeyA);
        assert_eq!(source, InputSource::Keyboard(KeyCode::KeyA));
    }

    #[test]
    fn test_default_bindings_cover_controls() {
        for player_id in 0..2 {
            let actions: HashSet<Action> = default_bindings(player_id)
                .into_iter()
                .map(|(_, action)| action)
                .collect();
            assert!(actions.contains(&Action::MoveLeft));
            assert!(actions.contains(&Action::MoveRight));
            assert!(actions.contains(&Action::Punch));
        }
        assert!(default_bindings(2).is_empty());
    }

    #[test]
    fn test_players_do_not_share_keys() {
        let mut seen_sources = HashSet::new();
        for (source, _) in default_p1_bindings()
            .into_iter()
            .chain(default_p2_bindings())
            .chain(global_bindings())
        {
            assert!(seen_sources.insert(source), "Duplicate input source found");
        }
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_from_name("j"), Some(KeyCode::KeyJ));
        assert_eq!(key_from_name("J"), Some(KeyCode::KeyJ));
        assert_eq!(key_from_name("7"), Some(KeyCode::Digit7));
        assert_eq!(key_from_name("Left"), Some(KeyCode::ArrowLeft));
        assert_eq!(key_from_name("Numpad5"), Some(KeyCode::Numpad5));
        assert_eq!(key_from_name("Escape"), None);
        assert_eq!(key_from_name(""), None);
    }

    #[test]
    fn test_parse_bindings() {
        let bindings = parse_bindings("left=J, right = L ,Punch=Space,").unwrap();
        assert_eq!(
            bindings,
            vec![
                (InputSource::key(KeyCode::KeyJ), Action::MoveLeft),
                (InputSource::key(KeyCode::KeyL), Action::MoveRight),
                (InputSource::key(KeyCode::Space), Action::Punch),
            ]
        );
        assert!(parse_bindings("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_bindings_errors() {
        assert_eq!(
            parse_bindings("left"),
            Err(BindingError::Malformed("left".to_string()))
        );
        assert_eq!(
            parse_bindings("quit=Q"),
            Err(BindingError::UnknownAction("quit".to_string()))
        );
        assert_eq!(
            parse_bindings("left=J,punch=Hyper"),
            Err(BindingError::UnknownKey("Hyper".to_string()))
        );
    }

    #[test]
    fn test_global_keys() {
        assert_eq!(
            global_bindings(),
            vec![
                (InputSource::key(KeyCode::Escape), Action::Quit),
                (InputSource::key(KeyCode::F1), Action::ToggleHitboxes),
            ]
        );
    }
}
