mod app;
mod config;
mod log_page;
mod poller;
mod settings;
mod ticker;
mod ui;
mod view_state;

use std::path::PathBuf;
use eframe::egui;
use log::warn;

use crate::app::{App, AppModel, APP_NAME};
use crate::config::AppConfig;
use crate::settings::SettingsStore;
use crate::ui::BUTTON_SIZE;
use crate::view_state::ViewState;

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = AppConfig::load_or_default(&working_dir).unwrap_or_else(|e| {
        warn!("Ignoring application config: {e}");
        AppConfig::default()
    });

    let store = SettingsStore::new(config.settings_path(&working_dir));
    let persisted = store.load().unwrap_or_else(|e| {
        warn!("Ignoring settings file {}: {e}", store.path().display());
        None
    });

    let mut state = ViewState::from_config(&config);
    let mut viewport = egui::ViewportBuilder::default()
        .with_title(APP_NAME)
        .with_min_inner_size([BUTTON_SIZE.x, BUTTON_SIZE.y * 2.0]);

    if let Some(settings) = &persisted {
        state.apply_settings(settings);
        viewport = viewport.with_fullscreen(settings.fullscreen);
    }
    // Otherwise the window system picks the position.
    if let Some((x, y)) = state.screen_position {
        viewport = viewport.with_position([x as f32, y as f32]);
    }
    viewport = viewport.with_inner_size([state.window_width as f32, state.window_height as f32]);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let model = AppModel::new(config, state);

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, model, store)))),
    )
}
