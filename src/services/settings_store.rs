//! Persistence of the workout configuration as a flat key/value record

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::state::WorkoutConfig;

/// Default file name of the settings record
pub const DEFAULT_SETTINGS_FILE: &str = "tabata-settings-v2.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to write settings file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize settings")]
    Serialize(#[from] serde_json::Error),

    #[error("settings store is poisoned")]
    Poisoned,
}

/// Where the configuration lives between runs
///
/// `load` never fails: a missing or unreadable record yields the defaults.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> WorkoutConfig;
    fn save(&self, config: &WorkoutConfig) -> Result<(), SettingsError>;
}

/// JSON object on disk, e.g. `{"prepare":10,"work":20,...}`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> WorkoutConfig {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                return WorkoutConfig::default();
            }
            Err(e) => {
                warn!("Failed to read settings {}: {}", self.path.display(), e);
                return WorkoutConfig::default();
            }
        };

        match serde_json::from_str::<WorkoutConfig>(&raw) {
            Ok(config) => {
                info!("Loaded settings from {}", self.path.display());
                config.sanitized()
            }
            Err(e) => {
                warn!("Failed to load settings {}: {}", self.path.display(), e);
                WorkoutConfig::default()
            }
        }
    }

    fn save(&self, config: &WorkoutConfig) -> Result<(), SettingsError> {
        let json = serde_json::to_string(config)?;
        fs::write(&self.path, json).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the configuration in memory only
#[derive(Debug, Default)]
pub struct MemoryStore {
    config: Mutex<Option<WorkoutConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WorkoutConfig) -> Self {
        Self {
            config: Mutex::new(Some(config)),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> WorkoutConfig {
        self.config
            .lock()
            .ok()
            .and_then(|config| *config)
            .map(|config| config.sanitized())
            .unwrap_or_default()
    }

    fn save(&self, config: &WorkoutConfig) -> Result<(), SettingsError> {
        let mut slot = self.config.lock().map_err(|_| SettingsError::Poisoned)?;
        *slot = Some(*config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Setting;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join(DEFAULT_SETTINGS_FILE));
        assert_eq!(store.load(), WorkoutConfig::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SETTINGS_FILE);
        fs::write(&path, "{not json").unwrap();
        assert_eq!(JsonFileStore::new(&path).load(), WorkoutConfig::default());

        fs::write(&path, r#"{"work":-3}"#).unwrap();
        assert_eq!(JsonFileStore::new(&path).load(), WorkoutConfig::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join(DEFAULT_SETTINGS_FILE));
        let mut config = WorkoutConfig::default();
        config.set(Setting::Cycles, 4);
        config.set(Setting::SetRest, 0);
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }

    #[test]
    fn record_uses_flat_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join(DEFAULT_SETTINGS_FILE));
        store.save(&WorkoutConfig::default()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(value["setRest"], 60);
        assert_eq!(value["cycles"], 8);
    }

    #[test]
    fn out_of_range_values_are_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SETTINGS_FILE);
        fs::write(&path, r#"{"cycles":0,"work":2,"sets":99}"#).unwrap();
        let config = JsonFileStore::new(&path).load();
        assert_eq!(config.cycles, 1);
        assert_eq!(config.work, 5);
        assert_eq!(config.sets, 10);
    }

    #[test]
    fn save_into_missing_directory_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent").join(DEFAULT_SETTINGS_FILE));
        assert!(matches!(
            store.save(&WorkoutConfig::default()),
            Err(SettingsError::Write { .. })
        ));
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.load(), WorkoutConfig::default());
        let config = WorkoutConfig {
            work: 45,
            ..Default::default()
        };
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }
}
