//! Gate configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use mediagate_policy::AutoDownloadPermissions;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Permissions used until the user stores their own
    #[serde(default)]
    pub default_permissions: AutoDownloadPermissions,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("mediagate.db"),
            default_permissions: AutoDownloadPermissions::default(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("mediagate"))
            .unwrap_or_else(|| PathBuf::from(".mediagate"))
    }

    /// Read a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;

        if config.database_path.as_os_str().is_empty() {
            return Err(CoreError::Config(format!(
                "{}: database_path is empty",
                path.display()
            )));
        }

        tracing::debug!(path = %path.display(), "Loaded config");

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagate_policy::{MediaKind, NetworkClass, Purpose};

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new(dir.path().to_path_buf());
        config.default_permissions.set_allowed(
            NetworkClass::MobileRoaming,
            Purpose::Media,
            [MediaKind::Audio],
        );
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_permissions_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"database_path": "/tmp/gate.db"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/gate.db"));
        assert_eq!(
            config.default_permissions,
            AutoDownloadPermissions::default()
        );
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"database_path": ""}"#).unwrap();

        assert!(matches!(Config::load(&path), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_default_lives_under_data_dir() {
        let config = Config::default();
        assert!(config.database_path.ends_with("mediagate/mediagate.db")
            || config.database_path.ends_with(".mediagate/mediagate.db"));
    }
}
