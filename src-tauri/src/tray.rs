use tauri::{
    menu::{CheckMenuItem, Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Wry,
};

use crate::actions;

pub const TRAY_ID: &str = "clipshot-tray";

const MENU_SHOW: &str = "show";
const MENU_SAVE_NOW: &str = "save_now";
const MENU_AUTO_SAVE: &str = "auto_save";
const MENU_QUIT: &str = "quit";

pub fn auto_save_label(enabled: bool) -> &'static str {
    if enabled {
        "Auto-save: On"
    } else {
        "Auto-save: Off"
    }
}

/// Status-area icon and its menu. The auto-save item mirrors the setting in
/// both its text and its check mark.
pub struct TrayController {
    auto_save_item: CheckMenuItem<Wry>,
}

impl TrayController {
    pub fn build(app: &AppHandle, auto_save: bool) -> tauri::Result<Self> {
        let show_item = MenuItem::with_id(app, MENU_SHOW, "Show settings", true, None::<&str>)?;
        let save_item =
            MenuItem::with_id(app, MENU_SAVE_NOW, "Save screenshot now", true, None::<&str>)?;
        let auto_save_item = CheckMenuItem::with_id(
            app,
            MENU_AUTO_SAVE,
            auto_save_label(auto_save),
            true,
            auto_save,
            None::<&str>,
        )?;
        let separator = PredefinedMenuItem::separator(app)?;
        let quit_item = MenuItem::with_id(app, MENU_QUIT, "Quit", true, None::<&str>)?;
        let menu = Menu::with_items(
            app,
            &[&show_item, &save_item, &auto_save_item, &separator, &quit_item],
        )?;

        let mut builder = TrayIconBuilder::with_id(TRAY_ID)
            .menu(&menu)
            .tooltip("ClipShot")
            .on_menu_event(|app, event| match event.id.as_ref() {
                MENU_SHOW => actions::show_settings_window(app),
                MENU_SAVE_NOW => actions::save_now(app),
                MENU_AUTO_SAVE => actions::toggle_auto_save(app),
                MENU_QUIT => actions::quit(app),
                other => log::debug!("Unhandled tray menu item: {}", other),
            })
            .on_tray_icon_event(|tray, event| {
                if let TrayIconEvent::Click {
                    button: MouseButton::Left,
                    button_state: MouseButtonState::Up,
                    ..
                } = event
                {
                    actions::show_settings_window(tray.app_handle());
                }
            });

        if let Some(icon) = app.default_window_icon() {
            builder = builder.icon(icon.clone());
        }
        builder.build(app)?;

        Ok(Self { auto_save_item })
    }

    pub fn reflect_auto_save(&self, enabled: bool) {
        if let Err(e) = self.auto_save_item.set_text(auto_save_label(enabled)) {
            log::error!("Failed to update tray menu text: {}", e);
        }
        if let Err(e) = self.auto_save_item.set_checked(enabled) {
            log::error!("Failed to update tray menu check mark: {}", e);
        }
    }
}
