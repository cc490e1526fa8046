// Asset path resolution

use std::path::{Path, PathBuf};

/// Supported asset types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Texture,
}

impl AssetType {
    /// Get the default directory for this asset type
    pub fn default_directory(&self) -> &'static str {
        match self {
            AssetType::Texture => "textures",
        }
    }
}

/// Asset loader responsible for finding asset files
#[derive(Debug, Clone)]
pub struct AssetLoader {
    base_path: PathBuf,
}

impl AssetLoader {
    /// Create a new asset loader with the given base path
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for an asset
    pub fn resolve_path(&self, asset_type: AssetType, name: &str) -> PathBuf {
        self.base_path
            .join(asset_type.default_directory())
            .join(name)
    }

    /// Check if an asset exists
    pub fn exists(&self, asset_type: AssetType, name: &str) -> bool {
        self.resolve_path(asset_type, name).exists()
    }

    /// Names from `names` that have no file on disk
    pub fn missing<'a>(&self, asset_type: AssetType, names: &[&'a str]) -> Vec<&'a str> {
        names
            .iter()
            .copied()
            .filter(|name| !self.exists(asset_type, name))
            .collect()
    }

    /// Get the base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_type_directories() {
        assert_eq!(AssetType::Texture.default_directory(), "textures");
    }

    #[test]
    fn test_loader_path_resolution() {
        let loader = AssetLoader::new("/game/assets");
        let path = loader.resolve_path(AssetType::Texture, "star.png");

        assert_eq!(path, PathBuf::from("/game/assets/textures/star.png"));
        assert_eq!(loader.base_path(), Path::new("/game/assets"));
    }

    #[test]
    fn test_missing() {
        let dir = tempfile::tempdir().unwrap();
        let textures = dir.path().join("textures");
        std::fs::create_dir(&textures).unwrap();
        std::fs::write(textures.join("star.png"), b"").unwrap();

        let loader = AssetLoader::new(dir.path());
        assert!(loader.exists(AssetType::Texture, "star.png"));
        assert_eq!(
            loader.missing(AssetType::Texture, &["star.png", "robot-red-eye.png"]),
            vec!["robot-red-eye.png"]
        );
    }

    #[test]
    fn test_missing_directory() {
        let loader = AssetLoader::new("/definitely/not/here");
        assert_eq!(
            loader.missing(AssetType::Texture, &["star.png"]),
            vec!["star.png"]
        );
    }
}
