use std::time::{Duration, Instant};
use eframe::{egui::{self, *}, Frame};
use log::{debug, error, info, warn};

use super::config::AppConfig;
use super::log_page::{LogView, LOG_BACKGROUND};
use super::poller::{PollError, Poller, TickOutcome};
use super::settings::SettingsStore;
use super::ticker::Ticker;
use super::ui::{RepeatTimer, SimpleButton, BUTTON_SIZE};
use super::view_state::{ViewState, WindowGeometry};

pub const APP_NAME : &str = "Log File Reader";

const APP_BACKGROUND : Color32 = Color32::from_rgb(0x4f, 0x4f, 0x4f);
const TOOLBAR_GAP : f32 = 1.0;
const FILENAME_LABEL_PADDING : f32 = 15.0;
const REPEAT_REPAINT : Duration = Duration::from_millis(40);

/// State shared by the toolbar and the poll loop.
pub struct AppModel {
    pub config: AppConfig,
    pub state: ViewState,
    pub poller: Poller,
    pub log_view: LogView,
    last_poll_error: Option<String>,
}
impl AppModel {
    pub fn new(config: AppConfig, state: ViewState) -> Self {
        Self {
            poller: Poller::from_config(&config),
            config,
            state,
            log_view: LogView::default(),
            last_poll_error: None,
        }
    }

    pub fn poll(&mut self) {
        match self.poller.on_tick(&mut self.state, &mut self.log_view) {
            Ok(TickOutcome::Reloaded { size }) => {
                self.last_poll_error = None;
                debug!("Display refreshed ({size} bytes)");
            }
            Ok(_) => self.last_poll_error = None,
            // Next tick tries again; nothing was recorded.
            Err(e) => {
                self.report_poll_error(&e);
            }
        }
    }

    // A failure that repeats every tick is warned about once.
    fn report_poll_error(&mut self, error: &PollError) -> bool {
        let message = error.to_string();
        if self.last_poll_error.as_deref() == Some(message.as_str()) {
            debug!("{message}");
            return false;
        }
        warn!("{message}");
        self.last_poll_error = Some(message);
        true
    }

    /// Save settings and stop polling. Only the first call does anything;
    /// the stopped ticker marks the app as shut down.
    pub fn shutdown(&mut self, ticker: &mut Ticker, store: &SettingsStore, window: WindowGeometry) -> bool {
        if !ticker.is_running() {
            return false;
        }
        ticker.stop();

        let snapshot = self.state.snapshot(window);
        if let Err(e) = store.save(&snapshot) {
            error!("Couldn't save settings to {}: {e}", store.path().display());
        }
        true
    }

    pub fn choose_file(&mut self) {
        let mut dialog = rfd::FileDialog::new().set_title("Select the text-based file to read.");
        if let Some(home) = dirs::home_dir() {
            dialog = dialog.set_directory(home);
        }

        match dialog.pick_file() {
            Some(file) => {
                info!("Selected {}", file.display());
                self.state.set_file_path(file);
            }
            None => debug!("File selection cancelled"),
        }
    }
}

/// Application root: toolbar on top, log text below.
pub struct App {
    model: AppModel,
    settings: SettingsStore,
    ticker: Ticker,
    zoom_in: RepeatTimer,
    zoom_out: RepeatTimer,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, model: AppModel, settings: SettingsStore) -> Self {
        cc.egui_ctx.set_visuals(Visuals::dark());

        let mut ticker = Ticker::new(model.config.poll_interval());
        ticker.start(Instant::now());
        info!(
            "Polling {} every {:?}",
            model.state.file_path.display(),
            model.config.poll_interval()
        );

        Self {
            model,
            settings,
            ticker,
            zoom_in: RepeatTimer::default(),
            zoom_out: RepeatTimer::default(),
        }
    }

    // Remember the windowed size so a fullscreen exit does not overwrite it.
    fn track_window(&mut self, ctx: &Context) -> WindowGeometry {
        let (inner, outer, fullscreen) = ctx.input(|i| {
            let viewport = i.viewport();
            (viewport.inner_rect, viewport.outer_rect, viewport.fullscreen.unwrap_or(false))
        });

        if !fullscreen {
            if let Some(inner) = inner {
                self.model.state.window_width = inner.width().round() as i32;
                self.model.state.window_height = inner.height().round() as i32;
            }
        }

        let position = outer.map(|rect| (rect.min.x.round() as i32, rect.min.y.round() as i32));
        if position.is_some() {
            self.model.state.screen_position = position;
        }
        WindowGeometry { position, fullscreen }
    }

    fn toolbar(&mut self, ui: &mut Ui, now: Instant) {
        ui.spacing_mut().item_spacing = vec2(TOOLBAR_GAP, 0.0);

        ui.add(SimpleButton::new("Freeze").toggle(&mut self.model.state.frozen));
        ui.add(SimpleButton::new("Auto Scroll").toggle(&mut self.model.state.auto_scroll));

        let zoom_in = ui.add(SimpleButton::new("Zoom In"));
        if self.zoom_in.update(zoom_in.is_pointer_button_down_on(), now) {
            self.model.state.increase_font_size();
        }
        let zoom_out = ui.add(SimpleButton::new("Zoom Out"));
        if self.zoom_out.update(zoom_out.is_pointer_button_down_on(), now) {
            self.model.state.decrease_font_size();
        }

        if ui.add(SimpleButton::new("Select File")).clicked() {
            self.model.choose_file();
        }

        ui.add_space(FILENAME_LABEL_PADDING);
        ui.label(
            RichText::new(self.model.state.file_path.to_string_lossy())
                .color(Color32::WHITE),
        );
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        let now = Instant::now();
        if self.ticker.poll(now) {
            self.model.poll();
        }

        let window = self.track_window(ctx);
        if ctx.input(|i| i.key_pressed(Key::F11)) {
            ctx.send_viewport_cmd(ViewportCommand::Fullscreen(!window.fullscreen));
        }

        TopBottomPanel::top("toolbar")
            .exact_height(BUTTON_SIZE.y)
            .frame(egui::Frame::default().fill(APP_BACKGROUND))
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| self.toolbar(ui, now));
            });

        CentralPanel::default()
            .frame(egui::Frame::default().fill(LOG_BACKGROUND))
            .show(ctx, |ui| {
                self.model.log_view.ui(ui, self.model.state.font_size());
            });

        if ctx.input(|i| i.viewport().close_requested()) {
            self.model.shutdown(&mut self.ticker, &self.settings, window);
            return;
        }

        if self.zoom_in.is_held() || self.zoom_out.is_held() {
            ctx.request_repaint_after(REPEAT_REPAINT);
        }
        if let Some(wait) = self.ticker.time_until_due(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}
