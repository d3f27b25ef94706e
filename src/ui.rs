use std::time::{Duration, Instant};
use eframe::egui::{self, Align2, Color32, FontId, Response, Sense, Ui, Vec2, Widget};

pub const BUTTON_SIZE : Vec2 = Vec2::new(100.0, 30.0);

const BUTTON_OFF : Color32 = Color32::from_rgb(0x81, 0x81, 0x81);
const BUTTON_ON : Color32 = Color32::from_rgb(0xf5, 0xf5, 0xf5);
const BUTTON_HOVER : Color32 = Color32::from_rgb(0xc0, 0xc0, 0xc0);
const BUTTON_FONT_SIZE : f32 = 14.0;

/// Flat, square toolbar button. With `toggle` it flips a bool on click and
/// paints its state; without it is a plain push button.
pub struct SimpleButton<'a> {
    text: &'a str,
    toggle: Option<&'a mut bool>,
}

impl<'a> SimpleButton<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, toggle: None }
    }

    pub fn toggle(mut self, state: &'a mut bool) -> Self {
        self.toggle = Some(state);
        self
    }
}

impl Widget for SimpleButton<'_> {
    fn ui(mut self, ui: &mut Ui) -> Response {
        let (rect, mut response) = ui.allocate_exact_size(BUTTON_SIZE, Sense::click());

        if response.clicked() {
            if let Some(state) = self.toggle.as_deref_mut() {
                *state = !*state;
                response.mark_changed();
            }
        }

        if ui.is_rect_visible(rect) {
            let on = self.toggle.as_deref().copied().unwrap_or(false);
            let fill = if response.hovered() {
                BUTTON_HOVER
            } else if on {
                BUTTON_ON
            } else {
                BUTTON_OFF
            };
            let painter = ui.painter();
            painter.rect_filled(rect, 0.0, fill);

            // Pressed buttons nudge their label down-right.
            let mut text_rect = rect.shrink(1.0);
            if response.is_pointer_button_down_on() {
                text_rect = text_rect.translate(egui::vec2(1.0, 1.0));
            }
            painter.text(
                text_rect.center(),
                Align2::CENTER_CENTER,
                self.text,
                FontId::proportional(BUTTON_FONT_SIZE),
                Color32::BLACK,
            );
        }

        response
    }
}

/// Turns "button held" into discrete presses: one immediately, then one per
/// `interval` once `initial_delay` has passed.
#[derive(Debug)]
pub struct RepeatTimer {
    initial_delay: Duration,
    interval: Duration,
    next_fire: Option<Instant>,
}

impl RepeatTimer {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self { initial_delay, interval, next_fire: None }
    }

    pub fn is_held(&self) -> bool {
        self.next_fire.is_some()
    }

    pub fn update(&mut self, held: bool, now: Instant) -> bool {
        if !held {
            self.next_fire = None;
            return false;
        }
        match self.next_fire {
            None => {
                self.next_fire = Some(now + self.initial_delay);
                true
            }
            Some(due) if now >= due => {
                self.next_fire = Some(now + self.interval);
                true
            }
            Some(_) => false,
        }
    }
}

impl Default for RepeatTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(200), Duration::from_millis(40))
    }
}
