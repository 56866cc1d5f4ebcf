use alphaworld_world::{LockMode, WorldOptions};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "alphaworld.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// World used when `--world` is not given.
    pub world_dir: Option<PathBuf>,
    /// Lock convention used when opening worlds. Observing by default so
    /// inspecting a world does not kick out a running game.
    pub lock_mode: LockMode,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            world_dir: None,
            lock_mode: LockMode::Observe,
        }
    }
}

impl CliConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<CliConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    CliConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                CliConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    pub fn world_options(&self) -> WorldOptions {
        WorldOptions::default().lock_mode(self.lock_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = CliConfig::load_from_path(&dir.path().join("absent.toml"));
        assert_eq!(cfg, CliConfig::default());
        assert_eq!(cfg.lock_mode, LockMode::Observe);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alphaworld.toml");
        fs::write(&path, "lock_mode = \"cooperative\"\n").unwrap();
        let cfg = CliConfig::load_from_path(&path);
        assert_eq!(cfg.lock_mode, LockMode::Cooperative);
        assert_eq!(cfg.world_dir, None);
        assert_eq!(cfg.world_options().lock_mode, LockMode::Cooperative);
    }

    #[test]
    fn unparsable_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alphaworld.toml");
        fs::write(&path, "lock_mode = \"exclusive\"\n").unwrap();
        assert_eq!(CliConfig::load_from_path(&path), CliConfig::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("alphaworld.toml");
        let cfg = CliConfig {
            world_dir: Some(PathBuf::from("/srv/worlds/World1")),
            lock_mode: LockMode::Cooperative,
        };
        cfg.save_to_path(&path).unwrap();
        assert_eq!(CliConfig::load_from_path(&path), cfg);
    }
}
