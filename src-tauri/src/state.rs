use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::clipboard::{ClipboardRead, ClipboardSource};
use crate::error::SettingsError;
use crate::persister::ImagePersister;
use crate::settings::{Settings, SettingsStore};
use crate::types::Notice;
use crate::watcher::{ClipboardWatcher, TickEvent};

/// Everything the running app mutates: the settings record and the watcher
/// with its snapshot. The Tauri layer keeps one of these behind a mutex.
pub struct AppCore {
    store: SettingsStore,
    settings: Settings,
    watcher: ClipboardWatcher,
    last_tick_failed: bool,
}

impl AppCore {
    /// Loads settings; watching starts right away if auto-save was left on.
    pub fn new(store: SettingsStore) -> Self {
        let settings = store.load();
        let mut watcher = ClipboardWatcher::new();
        watcher.set_watching(settings.auto_save);
        Self {
            store,
            settings,
            watcher,
            last_tick_failed: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn watcher(&self) -> &ClipboardWatcher {
        &self.watcher
    }

    // Mutations below apply in memory first; a failed write is reported but
    // the new value stays in effect.

    pub fn set_destination(&mut self, destination: PathBuf) -> Result<(), SettingsError> {
        log::info!("Destination set to {}", destination.display());
        self.settings.destination = destination;
        self.store.save(&self.settings)
    }

    pub fn reset_destination(&mut self) -> Result<(), SettingsError> {
        let default = self.store.default_destination().to_path_buf();
        self.set_destination(default)
    }

    pub fn set_auto_save(&mut self, enabled: bool) -> Result<(), SettingsError> {
        self.settings.auto_save = enabled;
        self.watcher.set_watching(enabled);
        self.store.save(&self.settings)
    }

    pub fn toggle_auto_save(&mut self) -> Result<(), SettingsError> {
        self.set_auto_save(!self.settings.auto_save)
    }

    /// Manual save. Independent of the watcher; leaves the snapshot alone.
    pub fn save_now(&self, source: &mut dyn ClipboardSource, at: DateTime<Local>) -> Notice {
        match source.read_dib() {
            Ok(ClipboardRead::Image(data)) => self.persist(&data, at),
            Ok(ClipboardRead::NoImage) => Notice::warning("There is no image on the clipboard"),
            Ok(ClipboardRead::Locked) => {
                Notice::warning("The clipboard is busy, try again in a moment")
            }
            Err(e) => Notice::error(format!("Failed to save: {}", e)),
        }
    }

    /// One auto-save tick. Returns a notice when something was saved, saving
    /// failed, or the clipboard started failing. A run of failed reads is
    /// reported once; the next successful read re-arms the report.
    pub fn tick(&mut self, source: &mut dyn ClipboardSource, at: DateTime<Local>) -> Option<Notice> {
        match self.watcher.poll(source) {
            TickEvent::NewImage(data) => {
                self.last_tick_failed = false;
                Some(self.persist(&data, at))
            }
            TickEvent::NoImage | TickEvent::Unchanged => {
                self.last_tick_failed = false;
                None
            }
            TickEvent::Failed(e) => {
                if self.last_tick_failed {
                    return None;
                }
                self.last_tick_failed = true;
                Some(Notice::error(format!("Failed to read the clipboard: {}", e)))
            }
            TickEvent::Idle | TickEvent::Locked => None,
        }
    }

    fn persist(&self, data: &[u8], at: DateTime<Local>) -> Notice {
        match ImagePersister::save(data, &self.settings.destination, &at) {
            Ok(file_name) => Notice::success(format!("Saved screenshot: {}", file_name)),
            Err(e) => Notice::error(format!("Failed to save: {}", e)),
        }
    }
}
