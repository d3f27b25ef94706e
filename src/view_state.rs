use std::path::{Path, PathBuf};
use log::debug;

use super::config::AppConfig;
use super::settings::PersistedSettings;

pub const MIN_FONT_SIZE : i32 = 5;

/// Live window facts, sampled from the window system when settings are saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowGeometry {
    // `None` where the window system does not report it (Wayland).
    pub position: Option<(i32, i32)>,
    pub fullscreen: bool,
}

/// Everything the user can adjust plus what the poller tracks about the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub file_path: PathBuf,
    font_size: i32,
    pub auto_scroll: bool,
    // Not persisted: every launch starts live.
    pub frozen: bool,
    pub window_width: i32,
    pub window_height: i32,
    // Last known outer position, restored or reported.
    pub screen_position: Option<(i32, i32)>,
    // `None` until the current file has been observed once.
    pub last_observed_size: Option<u64>,
}

impl ViewState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            file_path: config.default_log_file.clone(),
            font_size: config.default_font_size.max(MIN_FONT_SIZE),
            auto_scroll: false,
            frozen: false,
            window_width: config.default_window_width,
            window_height: config.default_window_height,
            screen_position: None,
            last_observed_size: None,
        }
    }

    pub fn font_size(&self) -> i32 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: i32) {
        self.font_size = size.max(MIN_FONT_SIZE);
    }

    pub fn increase_font_size(&mut self) {
        self.set_font_size(self.font_size.saturating_add(1));
    }

    pub fn decrease_font_size(&mut self) {
        self.set_font_size(self.font_size - 1);
    }

    /// Point the view at another file. The next tick reloads it unconditionally.
    pub fn set_file_path(&mut self, path: impl AsRef<Path>) {
        self.file_path = path.as_ref().to_path_buf();
        self.last_observed_size = None;
        debug!("Now watching {}", self.file_path.display());
    }

    /// Overlay a persisted snapshot, going through the same clamps as user input.
    /// Window geometry is only restored for positive sizes.
    pub fn apply_settings(&mut self, settings: &PersistedSettings) {
        self.set_file_path(&settings.filename);
        self.set_font_size(settings.font_size);
        self.auto_scroll = settings.auto_scroll;
        self.screen_position = settings.screen_position();
        if settings.window_width > 0 && settings.window_height > 0 {
            self.window_width = settings.window_width;
            self.window_height = settings.window_height;
        }
    }

    pub fn snapshot(&self, window: WindowGeometry) -> PersistedSettings {
        let position = window.position.or(self.screen_position);
        let (screen_pos_x, screen_pos_y) = position.unwrap_or_default();
        PersistedSettings {
            filename: self.file_path.to_string_lossy().to_string(),
            font_size: self.font_size,
            auto_scroll: self.auto_scroll,
            window_width: self.window_width,
            window_height: self.window_height,
            fullscreen: window.fullscreen,
            screen_pos_x,
            screen_pos_y,
            position_saved: position.is_some(),
        }
    }
}
