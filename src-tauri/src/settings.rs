use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::types::SettingsView;

pub const SETTINGS_FILE_NAME: &str = "screenshot_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    #[serde(rename = "save_path")]
    pub destination: PathBuf,
    pub auto_save: bool,
}

impl Settings {
    pub fn view(&self) -> SettingsView {
        SettingsView {
            save_path: self.destination.to_string_lossy().into_owned(),
            auto_save: self.auto_save,
        }
    }
}

// What is actually on disk; every key may be absent.
#[derive(Debug, Default, Deserialize)]
struct StoredSettings {
    save_path: Option<PathBuf>,
    auto_save: Option<bool>,
}

/// `<home>/Pictures/screenshots`
pub fn default_destination(home: &Path) -> PathBuf {
    home.join("Pictures").join("screenshots")
}

pub struct SettingsStore {
    file: PathBuf,
    default_destination: PathBuf,
}

impl SettingsStore {
    pub fn new(file: impl Into<PathBuf>, default_destination: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            default_destination: default_destination.into(),
        }
    }

    #[cfg(test)]
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn default_destination(&self) -> &Path {
        &self.default_destination
    }

    pub fn defaults(&self) -> Settings {
        Settings {
            destination: self.default_destination.clone(),
            auto_save: false,
        }
    }

    /// Reads the settings file. A missing file is replaced by the defaults,
    /// which are written out right away; an unreadable or malformed file
    /// falls back to the defaults without touching it.
    pub fn load(&self) -> Settings {
        if !self.file.exists() {
            let settings = self.defaults();
            log::info!("No settings file at {}, writing defaults", self.file.display());
            if let Err(e) = self.save(&settings) {
                log::warn!("Failed to write default settings: {}", e);
            }
            return settings;
        }

        let stored = fs::read_to_string(&self.file)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                serde_json::from_str::<StoredSettings>(&text).map_err(|e| e.to_string())
            });

        match stored {
            Ok(stored) => self.fill_defaults(stored),
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable settings file {}: {}",
                    self.file.display(),
                    e
                );
                self.defaults()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let json = serde_json::to_string(settings)?;
        fs::write(&self.file, json).map_err(|source| SettingsError::Write {
            path: self.file.clone(),
            source,
        })?;
        log::debug!("Settings written to {}", self.file.display());
        Ok(())
    }

    fn fill_defaults(&self, stored: StoredSettings) -> Settings {
        let destination = stored
            .save_path
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| self.default_destination.clone());

        Settings {
            destination,
            auto_save: stored.auto_save.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> SettingsStore {
        SettingsStore::new(dir.join(SETTINGS_FILE_NAME), dir.join("home/Pictures/screenshots"))
    }

    #[test]
    fn missing_file_yields_defaults_and_writes_them() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let settings = store.load();

        assert_eq!(settings.destination, dir.path().join("home/Pictures/screenshots"));
        assert!(!settings.auto_save);

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.file()).unwrap()).unwrap();
        assert_eq!(written["save_path"], settings.view().save_path.as_str());
        assert_eq!(written["auto_save"], false);
    }

    #[test]
    fn partial_file_fills_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        fs::write(store.file(), r#"{"auto_save": true}"#).unwrap();
        let settings = store.load();
        assert_eq!(settings.destination, store.default_destination());
        assert!(settings.auto_save);

        fs::write(store.file(), r#"{"save_path": "D:\\shots"}"#).unwrap();
        let settings = store.load();
        assert_eq!(settings.destination, PathBuf::from("D:\\shots"));
        assert!(!settings.auto_save);
    }

    #[test]
    fn null_or_empty_path_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        fs::write(store.file(), r#"{"save_path": null, "auto_save": false}"#).unwrap();
        assert_eq!(store.load().destination, store.default_destination());

        fs::write(store.file(), r#"{"save_path": ""}"#).unwrap();
        assert_eq!(store.load().destination, store.default_destination());
    }

    #[test]
    fn malformed_file_falls_back_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.file(), "{ not json").unwrap();

        let settings = store.load();

        assert_eq!(settings, store.defaults());
        assert_eq!(fs::read_to_string(store.file()).unwrap(), "{ not json");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let settings = Settings {
            destination: dir.path().join("elsewhere/ünïcode shots"),
            auto_save: true,
        };

        store.save(&settings).unwrap();

        assert_eq!(store.load(), settings);
    }

    #[test]
    fn save_into_missing_directory_reports_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nope/config.json"), dir.path());

        let err = store.save(&store.defaults()).unwrap_err();
        assert!(matches!(err, SettingsError::Write { .. }));
    }

    #[test]
    fn default_destination_is_under_pictures() {
        let home = Path::new("/home/alice");
        assert_eq!(
            default_destination(home),
            Path::new("/home/alice").join("Pictures").join("screenshots")
        );
    }
}
