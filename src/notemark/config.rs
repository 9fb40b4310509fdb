use crate::error::{NotemarkError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_WATCH_INTERVAL_SECS: u64 = 30;

/// Configuration, stored as config.json in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotemarkConfig {
    /// Sync root for mirror files. Defaults to `mirror/` under the data
    /// directory.
    #[serde(default)]
    pub sync_dir: Option<PathBuf>,

    /// Folder for new notes and for mirror files at the sync root.
    #[serde(default = "default_folder")]
    pub default_folder: String,

    /// Polling interval for `sync watch`, in seconds.
    #[serde(default = "default_watch_interval")]
    pub watch_interval_secs: u64,
}

fn default_folder() -> String {
    crate::model::DEFAULT_FOLDER.to_string()
}

fn default_watch_interval() -> u64 {
    DEFAULT_WATCH_INTERVAL_SECS
}

impl Default for NotemarkConfig {
    fn default() -> Self {
        Self {
            sync_dir: None,
            default_folder: default_folder(),
            watch_interval_secs: DEFAULT_WATCH_INTERVAL_SECS,
        }
    }
}

impl NotemarkConfig {
    /// Load config from the given directory, or return defaults if not found.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&config_path).map_err(NotemarkError::Io)?;
        let config: NotemarkConfig =
            serde_json::from_str(&content).map_err(NotemarkError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory.
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(NotemarkError::Io)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(NotemarkError::Serialization)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content).map_err(NotemarkError::Io)?;
        Ok(())
    }

    /// The effective sync root given the data directory.
    pub fn sync_root(&self, data_dir: &Path) -> PathBuf {
        self.sync_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("mirror"))
    }
}

/// The data directory: `$NOTEMARK_HOME` when set (tests, portable setups),
/// otherwise the platform data dir.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("NOTEMARK_HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }
    directories::ProjectDirs::from("com", "notemark", "notemark")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| NotemarkError::Api("Could not determine data directory".into()))
}

/// Where the note store lives under the data directory.
pub fn store_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("store")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = NotemarkConfig::default();
        assert_eq!(config.default_folder, "Notes");
        assert_eq!(config.watch_interval_secs, 30);
        assert!(config.sync_dir.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempdir().unwrap();
        let config = NotemarkConfig::load(dir.path()).unwrap();
        assert_eq!(config, NotemarkConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let config = NotemarkConfig {
            sync_dir: Some(PathBuf::from("/tmp/mirror")),
            default_folder: "Inbox".into(),
            watch_interval_secs: 5,
        };
        config.save(dir.path()).unwrap();
        assert_eq!(NotemarkConfig::load(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_sync_root_defaults_under_data_dir() {
        let config = NotemarkConfig::default();
        assert_eq!(
            config.sync_root(Path::new("/data")),
            PathBuf::from("/data/mirror")
        );
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{"default_folder": "Inbox"}"#,
        )
        .unwrap();
        let config = NotemarkConfig::load(dir.path()).unwrap();
        assert_eq!(config.default_folder, "Inbox");
        assert_eq!(config.watch_interval_secs, 30);
    }
}
