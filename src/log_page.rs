use eframe::egui::{Align, Color32, FontId, ScrollArea, TextEdit, Ui};
use eframe::egui::text::{CCursor, CCursorRange};

use super::poller::TextDisplay;

pub const LOG_BACKGROUND : Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
const LOG_TEXT : Color32 = Color32::WHITE;

/// Read-only text area that shows the last loaded file content.
#[derive(Default)]
pub struct LogView {
    text: String,
    pending_caret: Option<usize>,
}

impl TextDisplay for LogView {
    fn set_text(&mut self, text: String) {
        self.text = text;
    }

    fn reveal_caret(&mut self, char_index: usize) {
        self.pending_caret = Some(char_index);
    }
}

impl LogView {
    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ui(&mut self, ui: &mut Ui, font_size: i32) {
        ScrollArea::both()
            .id_salt("log_scroll")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let mut text = self.text.as_str();
                let mut output = TextEdit::multiline(&mut text)
                    .font(FontId::monospace(font_size as f32))
                    .text_color(LOG_TEXT)
                    .frame(false)
                    .desired_width(f32::INFINITY)
                    .show(ui);

                if let Some(index) = self.pending_caret.take() {
                    let cursor = CCursor::new(index);
                    output.state.cursor.set_char_range(Some(CCursorRange::one(cursor)));
                    output.state.store(ui.ctx(), output.response.id);

                    let caret_rect = output
                        .galley
                        .pos_from_cursor(cursor)
                        .translate(output.galley_pos.to_vec2());
                    ui.scroll_to_rect(caret_rect, Some(Align::Center));
                }
            });
    }
}
