use std::fs;
use std::io;
use std::path::PathBuf;
use log::{debug, trace};
use thiserror::Error;

use super::config::AppConfig;
use super::view_state::ViewState;

pub const FILE_NOT_FOUND_TEXT : &str = "LOG FILE READER ERROR: file not found.";

const BYTE_ORDER_MARK : char = '\u{feff}';

/// The surface the poller writes into.
pub trait TextDisplay {
    fn set_text(&mut self, text: String);

    /// Put the caret at `char_index` and scroll so it is visible.
    fn reveal_caret(&mut self, char_index: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Frozen,
    Missing,
    Unchanged,
    Reloaded { size: u64 },
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reloads the watched file whenever its size differs from the last observation.
/// Size is the only change signal: a rewrite that keeps the byte count is not seen.
#[derive(Debug, Clone)]
pub struct Poller {
    padding_lines: usize,
    caret_back_offset: usize,
}

impl Poller {
    pub fn new(padding_lines: usize, caret_back_offset: usize) -> Self {
        Self { padding_lines, caret_back_offset }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.padding_lines, config.caret_back_offset)
    }

    pub fn on_tick(
        &self,
        state: &mut ViewState,
        display: &mut impl TextDisplay,
    ) -> Result<TickOutcome, PollError> {
        if state.frozen {
            return Ok(TickOutcome::Frozen);
        }

        let path = &state.file_path;
        let size = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => metadata.len(),
            Ok(_) => {
                display.set_text(FILE_NOT_FOUND_TEXT.to_string());
                return Ok(TickOutcome::Missing);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                display.set_text(FILE_NOT_FOUND_TEXT.to_string());
                return Ok(TickOutcome::Missing);
            }
            Err(source) => return Err(PollError::Read { path: path.clone(), source }),
        };

        if state.last_observed_size == Some(size) {
            trace!("{} unchanged at {size} bytes", path.display());
            return Ok(TickOutcome::Unchanged);
        }

        let bytes = fs::read(path).map_err(|source| PollError::Read { path: path.clone(), source })?;
        let decoded = String::from_utf8_lossy(&bytes);
        let text = self.pad(decoded.trim_start_matches(BYTE_ORDER_MARK).trim());
        let char_count = text.chars().count();

        display.set_text(text);
        if state.auto_scroll {
            display.reveal_caret(char_count.saturating_sub(self.caret_back_offset));
        }

        debug!("Reloaded {} ({:?} -> {size} bytes)", path.display(), state.last_observed_size);
        state.last_observed_size = Some(size);
        Ok(TickOutcome::Reloaded { size })
    }

    // Trailing blank lines keep the last real line clear of the scrollbar.
    fn pad(&self, content: &str) -> String {
        let mut text = String::with_capacity(content.len() + self.padding_lines);
        text.push_str(content);
        text.extend(std::iter::repeat_n('\n', self.padding_lines));
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingDisplay {
        text: String,
        caret: Option<usize>,
        writes: usize,
    }

    impl TextDisplay for RecordingDisplay {
        fn set_text(&mut self, text: String) {
            self.text = text;
            self.writes += 1;
        }

        fn reveal_caret(&mut self, char_index: usize) {
            self.caret = Some(char_index);
        }
    }

    fn state_for(path: &Path) -> ViewState {
        let mut state = ViewState::from_config(&AppConfig::default());
        state.set_file_path(path);
        state
    }

    fn padded(content: &str) -> String {
        format!("{content}{}", "\n".repeat(20))
    }

    #[test]
    fn growth_from_empty_is_displayed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "").unwrap();

        let poller = Poller::from_config(&AppConfig::default());
        let mut state = state_for(&path);
        let mut display = RecordingDisplay::default();

        assert_eq!(poller.on_tick(&mut state, &mut display).unwrap(), TickOutcome::Reloaded { size: 0 });
        fs::write(&path, "line1\n").unwrap();
        assert_eq!(poller.on_tick(&mut state, &mut display).unwrap(), TickOutcome::Reloaded { size: 6 });

        assert_eq!(display.text, padded("line1"));
        assert_eq!(state.last_observed_size, Some(6));
    }

    #[test]
    fn missing_file_then_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("later.log");

        let poller = Poller::from_config(&AppConfig::default());
        let mut state = state_for(&path);
        let mut display = RecordingDisplay::default();

        assert_eq!(poller.on_tick(&mut state, &mut display).unwrap(), TickOutcome::Missing);
        assert_eq!(display.text, FILE_NOT_FOUND_TEXT);
        assert_eq!(state.last_observed_size, None);

        fs::write(&path, "hello").unwrap();
        poller.on_tick(&mut state, &mut display).unwrap();
        assert_eq!(display.text, padded("hello"));
    }

    #[test]
    fn equal_size_is_not_a_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "aaaa").unwrap();

        let poller = Poller::from_config(&AppConfig::default());
        let mut state = state_for(&path);
        let mut display = RecordingDisplay::default();
        poller.on_tick(&mut state, &mut display).unwrap();

        fs::write(&path, "bbbb").unwrap();
        assert_eq!(poller.on_tick(&mut state, &mut display).unwrap(), TickOutcome::Unchanged);
        assert_eq!(display.text, padded("aaaa"));
        assert_eq!(display.writes, 1);
    }

    #[test]
    fn updates_track_size_sequence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");

        let poller = Poller::from_config(&AppConfig::default());
        let mut state = state_for(&path);
        let mut display = RecordingDisplay::default();

        let contents = ["a", "ab", "cd", "abc", "x", "x", "truncated!"];
        let mut previous: Option<usize> = None;
        for content in contents {
            fs::write(&path, content).unwrap();
            let writes_before = display.writes;
            poller.on_tick(&mut state, &mut display).unwrap();

            let changed = previous != Some(content.len());
            assert_eq!(display.writes > writes_before, changed, "content {content:?}");
            previous = Some(content.len());
        }
    }

    #[test]
    fn shrinking_file_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rotated.log");
        fs::write(&path, "a long first generation\n").unwrap();

        let poller = Poller::from_config(&AppConfig::default());
        let mut state = state_for(&path);
        let mut display = RecordingDisplay::default();
        poller.on_tick(&mut state, &mut display).unwrap();

        fs::write(&path, "new\n").unwrap();
        assert_eq!(poller.on_tick(&mut state, &mut display).unwrap(), TickOutcome::Reloaded { size: 4 });
        assert_eq!(display.text, padded("new"));
    }

    #[test]
    fn frozen_view_catches_up_after_thaw() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "one\n").unwrap();

        let poller = Poller::from_config(&AppConfig::default());
        let mut state = state_for(&path);
        let mut display = RecordingDisplay::default();
        poller.on_tick(&mut state, &mut display).unwrap();

        state.frozen = true;
        fs::write(&path, "one\ntwo\n").unwrap();
        assert_eq!(poller.on_tick(&mut state, &mut display).unwrap(), TickOutcome::Frozen);
        fs::remove_file(&path).unwrap();
        assert_eq!(poller.on_tick(&mut state, &mut display).unwrap(), TickOutcome::Frozen);
        assert_eq!(display.text, padded("one"));
        assert_eq!(state.last_observed_size, Some(4));

        fs::write(&path, "one\ntwo\nthree\n").unwrap();
        state.frozen = false;
        poller.on_tick(&mut state, &mut display).unwrap();
        assert_eq!(display.text, padded("one\ntwo\nthree"));
    }

    #[test]
    fn auto_scroll_reveals_near_the_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "  héllo world  \n").unwrap();

        let poller = Poller::from_config(&AppConfig::default());
        let mut state = state_for(&path);
        let mut display = RecordingDisplay::default();

        poller.on_tick(&mut state, &mut display).unwrap();
        assert_eq!(display.caret, None);

        state.auto_scroll = true;
        fs::write(&path, "  héllo world!  \n").unwrap();
        poller.on_tick(&mut state, &mut display).unwrap();

        let chars = "héllo world!".chars().count() + 20;
        assert_eq!(display.caret, Some(chars - 15));
    }

    #[test]
    fn caret_offset_saturates_on_short_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "hi").unwrap();

        let poller = Poller::new(0, 15);
        let mut state = state_for(&path);
        state.auto_scroll = true;
        let mut display = RecordingDisplay::default();

        poller.on_tick(&mut state, &mut display).unwrap();
        assert_eq!(display.text, "hi");
        assert_eq!(display.caret, Some(0));
    }

    #[test]
    fn byte_order_mark_is_not_displayed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.log");
        fs::write(&path, "\u{feff}  first line\nsecond\n").unwrap();

        let poller = Poller::from_config(&AppConfig::default());
        let mut state = state_for(&path);
        let mut display = RecordingDisplay::default();

        poller.on_tick(&mut state, &mut display).unwrap();
        assert_eq!(display.text, padded("first line\nsecond"));
    }

    #[test]
    fn directory_is_treated_as_missing() {
        let dir = tempdir().unwrap();

        let poller = Poller::from_config(&AppConfig::default());
        let mut state = state_for(dir.path());
        let mut display = RecordingDisplay::default();

        assert_eq!(poller.on_tick(&mut state, &mut display).unwrap(), TickOutcome::Missing);
        assert_eq!(display.text, FILE_NOT_FOUND_TEXT);
    }
}
