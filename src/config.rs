// Application configuration: defaults with environment overrides

use crate::engine::input::{parse_bindings, Action, BindingError, InputSource};
use std::path::PathBuf;

pub const ASSETS_ENV: &str = "ROBOT_BRAWL_ASSETS";
pub const WIDTH_ENV: &str = "ROBOT_BRAWL_WIDTH";
pub const HEIGHT_ENV: &str = "ROBOT_BRAWL_HEIGHT";
/// Key overrides per player, e.g. `left=J,right=L,punch=K`
pub const KEYS_ENV: [&str; 2] = ["ROBOT_BRAWL_P1_KEYS", "ROBOT_BRAWL_P2_KEYS"];

/// Configuration errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidSize { key: &'static str, value: String },

    #[error("{key}: {source}")]
    InvalidKeys {
        key: &'static str,
        #[source]
        source: BindingError,
    },
}

/// Window and asset settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub title: String,
    /// Logical window width
    pub width: u32,
    /// Logical window height
    pub height: u32,
    /// Directory holding `textures/`
    pub asset_dir: PathBuf,
    /// Key overrides as (player index, bindings)
    pub controls: Vec<(usize, Vec<(InputSource, Action)>)>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Robot Brawl".to_string(),
            width: 1024,
            height: 512,
            asset_dir: PathBuf::from("assets"),
            controls: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `ROBOT_BRAWL_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = lookup(ASSETS_ENV) {
            config.asset_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(WIDTH_ENV) {
            config.width = parse_size(WIDTH_ENV, value)?;
        }
        if let Some(value) = lookup(HEIGHT_ENV) {
            config.height = parse_size(HEIGHT_ENV, value)?;
        }
        for (player_id, key) in KEYS_ENV.into_iter().enumerate() {
            if let Some(value) = lookup(key) {
                let bindings = parse_bindings(&value)
                    .map_err(|source| ConfigError::InvalidKeys { key, source })?;
                config.controls.push((player_id, bindings));
            }
        }

        Ok(config)
    }
}

fn parse_size(key: &'static str, value: String) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidSize { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use winit::keyboard::KeyCode;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!((config.width, config.height), (1024, 512));
        assert_eq!(config.asset_dir, PathBuf::from("assets"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (ASSETS_ENV, "/opt/brawl"),
            (WIDTH_ENV, "800"),
            (HEIGHT_ENV, " 600 "),
        ]))
        .unwrap();

        assert_eq!(config.asset_dir, PathBuf::from("/opt/brawl"));
        assert_eq!((config.width, config.height), (800, 600));
    }

    #[test]
    fn test_invalid_size() {
        let err = AppConfig::from_lookup(lookup(&[(WIDTH_ENV, "wide")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidSize {
                key: WIDTH_ENV,
                value: "wide".to_string()
            }
        );
        assert!(AppConfig::from_lookup(lookup(&[(HEIGHT_ENV, "0")])).is_err());
    }

    #[test]
    fn test_key_overrides() {
        let config = AppConfig::from_lookup(lookup(&[(KEYS_ENV[1], "left=J, punch=Space")])).unwrap();

        assert_eq!(
            config.controls,
            vec![(
                1,
                vec![
                    (InputSource::key(KeyCode::KeyJ), Action::MoveLeft),
                    (InputSource::key(KeyCode::Space), Action::Punch),
                ]
            )]
        );
    }

    #[test]
    fn test_invalid_key_override() {
        let err = AppConfig::from_lookup(lookup(&[(KEYS_ENV[0], "jump=W")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidKeys {
                key: KEYS_ENV[0],
                source: BindingError::UnknownAction("jump".to_string()),
            }
        );
        assert_eq!(
            err.to_string(),
            "ROBOT_BRAWL_P1_KEYS: unknown action \"jump\" (expected left, right or punch)"
        );
    }
}
