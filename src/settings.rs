use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use log::{debug, info};
use roxmltree::{Document, Node};
use thiserror::Error;

pub const ROOT_TAG : &str = "ProgramSettings";

const ATTR_FILENAME : &str = "filename";
const ATTR_FONT_SIZE : &str = "fontSize";
const ATTR_AUTO_SCROLL : &str = "autoScroll";
const ATTR_WINDOW_WIDTH : &str = "windowWidth";
const ATTR_WINDOW_HEIGHT : &str = "windowHeight";
const ATTR_FULLSCREEN : &str = "fullscreen";
const ATTR_SCREEN_POS_X : &str = "screenPosX";
const ATTR_SCREEN_POS_Y : &str = "screenPosY";

/// Flat snapshot of what survives a restart.
/// Missing attributes read back as zero, empty or false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSettings {
    pub filename: String,
    pub font_size: i32,
    pub auto_scroll: bool,
    pub window_width: i32,
    pub window_height: i32,
    pub fullscreen: bool,
    pub screen_pos_x: i32,
    pub screen_pos_y: i32,
    // Both position attributes were present when read.
    pub position_saved: bool,
}

impl PersistedSettings {
    /// Parse a settings document. `Ok(None)` means the root tag is not ours.
    pub fn from_xml(contents: &str) -> Result<Option<Self>, SettingsError> {
        let document = Document::parse(contents)?;
        let root = document.root_element();
        if root.tag_name().name() != ROOT_TAG {
            debug!("Ignoring settings document with root <{}>", root.tag_name().name());
            return Ok(None);
        }

        Ok(Some(Self {
            filename: root.attribute(ATTR_FILENAME).unwrap_or_default().to_string(),
            font_size: int_attribute(root, ATTR_FONT_SIZE),
            auto_scroll: bool_attribute(root, ATTR_AUTO_SCROLL),
            window_width: int_attribute(root, ATTR_WINDOW_WIDTH),
            window_height: int_attribute(root, ATTR_WINDOW_HEIGHT),
            fullscreen: bool_attribute(root, ATTR_FULLSCREEN),
            screen_pos_x: int_attribute(root, ATTR_SCREEN_POS_X),
            screen_pos_y: int_attribute(root, ATTR_SCREEN_POS_Y),
            position_saved: root.has_attribute(ATTR_SCREEN_POS_X)
                && root.has_attribute(ATTR_SCREEN_POS_Y),
        }))
    }

    /// Where the window last was, if the document recorded it.
    pub fn screen_position(&self) -> Option<(i32, i32)> {
        self.position_saved.then_some((self.screen_pos_x, self.screen_pos_y))
    }

    /// Every attribute is always written.
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\n<");
        out.push_str(ROOT_TAG);

        let attributes = [
            (ATTR_FILENAME, escape_attribute(&self.filename)),
            (ATTR_FONT_SIZE, self.font_size.to_string()),
            (ATTR_AUTO_SCROLL, bool_text(self.auto_scroll).to_string()),
            (ATTR_WINDOW_WIDTH, self.window_width.to_string()),
            (ATTR_WINDOW_HEIGHT, self.window_height.to_string()),
            (ATTR_FULLSCREEN, bool_text(self.fullscreen).to_string()),
            (ATTR_SCREEN_POS_X, self.screen_pos_x.to_string()),
            (ATTR_SCREEN_POS_Y, self.screen_pos_y.to_string()),
        ];
        for (name, value) in attributes {
            out.push_str(&format!(" {name}=\"{value}\""));
        }

        out.push_str("/>\n");
        out
    }
}

/// Reads and writes the settings document at a fixed path.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when there is no document or it belongs to something else.
    pub fn load(&self) -> Result<Option<PersistedSettings>, SettingsError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("No settings file at {}, using defaults", self.path.display());
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        PersistedSettings::from_xml(&contents)
    }

    pub fn save(&self, settings: &PersistedSettings) -> Result<(), SettingsError> {
        fs::write(&self.path, settings.to_xml())?;
        info!("Settings written to {}", self.path.display());
        Ok(())
    }
}

fn int_attribute(node: Node<'_, '_>, name: &str) -> i32 {
    node.attribute(name).map(parse_leading_int).unwrap_or(0)
}

fn bool_attribute(node: Node<'_, '_>, name: &str) -> bool {
    node.attribute(name)
        .and_then(|value| value.trim_start().chars().next())
        .map(|first| matches!(first, '1' | 't' | 'T' | 'y' | 'Y'))
        .unwrap_or(false)
}

// "42px" reads as 42, anything without leading digits as 0.
fn parse_leading_int(value: &str) -> i32 {
    let value = value.trim();
    let sign_len = usize::from(value.starts_with(['-', '+']));
    let digits_len = value[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len() - sign_len);
    value[..sign_len + digits_len].parse().unwrap_or(0)
}

fn bool_text(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse settings document: {0}")]
    Xml(#[from] roxmltree::Error),
}
