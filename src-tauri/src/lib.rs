mod actions;
mod clipboard;
mod dib;
mod error;
mod persister;
mod settings;
mod state;
mod tray;
mod types;
mod watcher;

use std::path::PathBuf;

use anyhow::Context;
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::DialogExt;

use actions::AppState;
use settings::{default_destination, SettingsStore, SETTINGS_FILE_NAME};
use state::AppCore;
use tray::TrayController;
use types::SettingsView;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_notification::init())
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            init(app.handle())?;
            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::CloseRequested { api, .. } = event {
                // Closing only hides; the tray keeps the app alive.
                let _ = window.hide();
                api.prevent_close();
            }
        })
        .invoke_handler(tauri::generate_handler![
            get_settings,
            choose_destination,
            reset_destination,
            set_auto_save,
            quit_app
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

fn init(app: &AppHandle) -> anyhow::Result<()> {
    let destination = match app.path().home_dir() {
        Ok(home) => default_destination(&home),
        Err(e) => {
            log::warn!("Could not resolve home directory ({}), using ./screenshots", e);
            PathBuf::from("screenshots")
        }
    };

    let core = AppCore::new(SettingsStore::new(SETTINGS_FILE_NAME, destination));
    let auto_save = core.settings().auto_save;
    log::info!(
        "Loaded settings: destination={}, auto_save={}",
        core.settings().destination.display(),
        auto_save
    );
    app.manage(AppState::new(core));

    let tray = TrayController::build(app, auto_save).context("Failed to create tray icon")?;
    app.manage(tray);

    actions::sync_timer(app);
    Ok(())
}

#[tauri::command]
fn get_settings(app: AppHandle) -> SettingsView {
    actions::settings_view(&app)
}

// Async so the blocking folder picker stays off the main thread.
#[tauri::command]
async fn choose_destination(app: AppHandle) -> Result<SettingsView, String> {
    let current = actions::current_destination(&app);
    let picked = app
        .dialog()
        .file()
        .set_title("Select destination folder")
        .set_directory(&current)
        .blocking_pick_folder();

    match picked {
        Some(folder) => {
            let path = folder.into_path().map_err(|e| e.to_string())?;
            Ok(actions::set_destination(&app, path))
        }
        None => Ok(actions::settings_view(&app)),
    }
}

#[tauri::command]
fn reset_destination(app: AppHandle) -> SettingsView {
    actions::reset_destination(&app)
}

#[tauri::command]
fn set_auto_save(app: AppHandle, enabled: bool) -> SettingsView {
    actions::set_auto_save(&app, enabled)
}

#[tauri::command]
fn quit_app(app: AppHandle) {
    actions::quit(&app);
}
