use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME : &str = "LogFileReader.toml";

const DEFAULT_POLL_INTERVAL_MS : u64 = 150;
const DEFAULT_PADDING_LINES : usize = 20;
const DEFAULT_CARET_BACK_OFFSET : usize = 15;
const DEFAULT_SETTINGS_FILE : &str = "LogFileReader.xml";
const DEFAULT_FONT_SIZE : i32 = 16;
const DEFAULT_WINDOW_WIDTH : i32 = 800;
const DEFAULT_WINDOW_HEIGHT : i32 = 700;

// ---------- Application config ----------
/// Tunables read once at startup. Every field is optional in the file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub poll_interval_ms: u64,
    pub padding_lines: usize,
    pub caret_back_offset: usize,
    pub settings_file: PathBuf,
    pub default_log_file: PathBuf,
    pub default_font_size: i32,
    pub default_window_width: i32,
    pub default_window_height: i32,
}
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            padding_lines: DEFAULT_PADDING_LINES,
            caret_back_offset: DEFAULT_CARET_BACK_OFFSET,
            settings_file: PathBuf::from(DEFAULT_SETTINGS_FILE),
            default_log_file: default_log_file(),
            default_font_size: DEFAULT_FONT_SIZE,
            default_window_width: DEFAULT_WINDOW_WIDTH,
            default_window_height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

impl AppConfig {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(dir.as_ref().join(CONFIG_FILE_NAME))?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(dir) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(err) => Err(err),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Settings document location, relative paths resolved against `dir`.
    pub fn settings_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(&self.settings_file)
    }
}

fn default_log_file() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        PathBuf::from("C:/logger.nka")
    }

    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir()
            .unwrap_or_default()
            .join("logger.nka")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse application config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_millis(150));
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "poll_interval_ms = 500\npadding_lines = 3\n",
        )
        .unwrap();

        let config = AppConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.padding_lines, 3);
        assert_eq!(config.caret_back_offset, DEFAULT_CARET_BACK_OFFSET);
        assert_eq!(config.settings_file, PathBuf::from(DEFAULT_SETTINGS_FILE));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "poll_interval_ms = \"soon\"").unwrap();

        let err = AppConfig::load_or_default(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn settings_path_is_relative_to_working_dir() {
        let config = AppConfig::default();
        assert_eq!(
            config.settings_path("/tmp/work"),
            Path::new("/tmp/work").join("LogFileReader.xml")
        );
    }
}
