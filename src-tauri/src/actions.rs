//! UI actions shared by the tray menu and the settings window commands.
//!
//! All of them run to completion before returning to the event loop. The
//! application state lives behind one mutex, so timer ticks and UI actions
//! never interleave.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_notification::NotificationExt;

use crate::clipboard::SystemClipboard;
use crate::error::SettingsError;
use crate::state::AppCore;
use crate::tray::{TrayController, TRAY_ID};
use crate::types::{Notice, Severity, SettingsView};
use crate::watcher::{PollTimer, POLL_INTERVAL};

pub const MAIN_WINDOW: &str = "main";
pub const SETTINGS_CHANGED_EVENT: &str = "settings-changed";

pub struct AppState {
    core: Mutex<AppCore>,
    timer: Mutex<PollTimer>,
}

impl AppState {
    pub fn new(core: AppCore) -> Self {
        Self {
            core: Mutex::new(core),
            timer: Mutex::new(PollTimer::new()),
        }
    }
}

// A panic mid-action leaves the data usable, so poisoning is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn settings_view(app: &AppHandle) -> SettingsView {
    let state = app.state::<AppState>();
    let view = lock(&state.core).settings().view();
    view
}

pub fn current_destination(app: &AppHandle) -> PathBuf {
    let state = app.state::<AppState>();
    let destination = lock(&state.core).settings().destination.clone();
    destination
}

pub fn notify(app: &AppHandle, notice: &Notice) {
    match notice.severity {
        Severity::Success => log::info!("{}", notice.message),
        Severity::Warning => log::warn!("{}", notice.message),
        Severity::Error => log::error!("{}", notice.message),
    }

    if let Err(e) = app
        .notification()
        .builder()
        .title(notice.severity.title())
        .body(&notice.message)
        .show()
    {
        log::error!("Failed to show notification: {}", e);
    }
}

fn report_settings_write(app: &AppHandle, result: Result<(), SettingsError>) {
    if let Err(e) = result {
        notify(app, &Notice::warning(format!("Settings were not saved: {}", e)));
    }
}

/// Pushes the current settings to the tray item and the settings window.
fn publish(app: &AppHandle, view: &SettingsView) {
    if let Some(tray) = app.try_state::<TrayController>() {
        tray.reflect_auto_save(view.auto_save);
    }
    if let Err(e) = app.emit(SETTINGS_CHANGED_EVENT, view.clone()) {
        log::error!("Failed to emit {} event: {}", SETTINGS_CHANGED_EVENT, e);
    }
}

/// Starts or stops the poll timer to match the watcher.
pub fn sync_timer(app: &AppHandle) {
    let state = app.state::<AppState>();
    let core = lock(&state.core);
    sync_timer_locked(app, &state, &core);
}

// Callers hold the core guard, so the timer always ends up matching the
// latest watcher state. Lock order is core, then timer.
fn sync_timer_locked(app: &AppHandle, state: &AppState, core: &AppCore) {
    let handle = app.clone();
    lock(&state.timer).follow(core.watcher().is_watching(), POLL_INTERVAL, move || {
        on_tick(&handle)
    });
}

fn on_tick(app: &AppHandle) {
    let state = app.state::<AppState>();
    let notice = lock(&state.core).tick(&mut SystemClipboard, Local::now());
    if let Some(notice) = notice {
        notify(app, &notice);
    }
}

pub fn show_settings_window(app: &AppHandle) {
    if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
        let _ = window.unminimize();
        let _ = window.show();
        let _ = window.set_focus();
    }
}

pub fn save_now(app: &AppHandle) {
    let state = app.state::<AppState>();
    let notice = lock(&state.core).save_now(&mut SystemClipboard, Local::now());
    notify(app, &notice);
}

/// Applies a settings mutation, then mirrors the result everywhere.
fn apply<F>(app: &AppHandle, mutate: F) -> SettingsView
where
    F: FnOnce(&mut AppCore) -> Result<(), SettingsError>,
{
    let (view, written) = {
        let state = app.state::<AppState>();
        let mut core = lock(&state.core);
        let written = mutate(&mut *core);
        sync_timer_locked(app, &state, &core);
        (core.settings().view(), written)
    };
    publish(app, &view);
    report_settings_write(app, written);
    view
}

pub fn set_auto_save(app: &AppHandle, enabled: bool) -> SettingsView {
    apply(app, |core| core.set_auto_save(enabled))
}

pub fn toggle_auto_save(app: &AppHandle) {
    apply(app, AppCore::toggle_auto_save);
}

pub fn set_destination(app: &AppHandle, destination: PathBuf) -> SettingsView {
    apply(app, |core| core.set_destination(destination))
}

pub fn reset_destination(app: &AppHandle) -> SettingsView {
    apply(app, AppCore::reset_destination)
}

/// Stops polling, removes the tray icon and exits.
pub fn quit(app: &AppHandle) {
    log::info!("Quit requested");
    lock(&app.state::<AppState>().timer).stop();
    let _ = app.remove_tray_by_id(TRAY_ID);
    app.exit(0);
}
