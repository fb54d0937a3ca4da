//! Configuration loaded from `config.toml`.
//!
//! Lookup order: an explicit path, then `$VEDIT_CONFIG_DIR/config.toml`,
//! then `<config dir>/vedit/config.toml`, then built-in defaults. Every
//! field is optional.
//!
//! ```toml
//! [engine]
//! tick_ms = 16
//! input_backoff_ms = 5
//! alternate_screen = true
//!
//! [theme]
//! status_warning_bg = "#cdcd00"
//!
//! [log]
//! filter = "vedit=debug"
//! ```

use crate::render::{Rgb, Theme};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming a directory that holds `config.toml`.
pub const CONFIG_DIR_ENV: &str = "VEDIT_CONFIG_DIR";

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File involved.
        path: PathBuf,
        /// Cause.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML for [`Config`].
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File involved.
        path: PathBuf,
        /// Cause.
        #[source]
        source: toml::de::Error,
    },
    /// A theme entry is not a `#rrggbb` color.
    #[error("invalid color for theme.{key}: {value:?}")]
    InvalidColor {
        /// Theme key.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame loop and terminal settings.
    pub engine: EngineConfig,
    /// Color overrides.
    pub theme: ThemeConfig,
    /// Log filtering.
    pub log: LogConfig,
}

/// Frame loop and terminal settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame period in milliseconds.
    pub tick_ms: u64,
    /// Input thread sleep when no key is waiting, in milliseconds.
    pub input_backoff_ms: u64,
    /// Draw on the alternate screen.
    pub alternate_screen: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            input_backoff_ms: 5,
            alternate_screen: true,
        }
    }
}

impl EngineConfig {
    /// Frame period, at least one millisecond.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Input back-off interval.
    pub fn input_backoff(&self) -> Duration {
        Duration::from_millis(self.input_backoff_ms)
    }
}

/// Optional `#rrggbb` overrides for [`Theme`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Text foreground
    pub text_fg: Option<String>,
    /// Background behind text, gutter and the message row
    pub background: Option<String>,
    /// Line number foreground
    pub gutter_fg: Option<String>,
    /// Cursor line marker foreground
    pub cursor_marker_fg: Option<String>,
    /// `~` foreground
    pub tilde_fg: Option<String>,
    /// Status row foreground
    pub status_info_fg: Option<String>,
    /// Status row background
    pub status_info_bg: Option<String>,
    /// Warning foreground
    pub status_warning_fg: Option<String>,
    /// Warning background
    pub status_warning_bg: Option<String>,
    /// Error foreground
    pub status_error_fg: Option<String>,
    /// Error background
    pub status_error_bg: Option<String>,
}

fn color(key: &'static str, value: Option<&String>) -> Result<Option<Rgb>, ConfigError> {
    value
        .map(|v| {
            v.parse::<Rgb>().map_err(|_| ConfigError::InvalidColor {
                key,
                value: v.clone(),
            })
        })
        .transpose()
}

impl ThemeConfig {
    /// Apply the overrides on top of the default theme.
    pub fn to_theme(&self) -> Result<Theme, ConfigError> {
        let mut theme = Theme::default();

        if let Some(bg) = color("background", self.background.as_ref())? {
            theme.text.bg = bg;
            theme.gutter.bg = bg;
            theme.cursor_marker.bg = bg;
            theme.tilde.bg = bg;
        }
        let overrides = [
            ("text_fg", &self.text_fg, &mut theme.text.fg),
            ("gutter_fg", &self.gutter_fg, &mut theme.gutter.fg),
            ("cursor_marker_fg", &self.cursor_marker_fg, &mut theme.cursor_marker.fg),
            ("tilde_fg", &self.tilde_fg, &mut theme.tilde.fg),
            ("status_info_fg", &self.status_info_fg, &mut theme.status_info.fg),
            ("status_info_bg", &self.status_info_bg, &mut theme.status_info.bg),
            ("status_warning_fg", &self.status_warning_fg, &mut theme.status_warning.fg),
            ("status_warning_bg", &self.status_warning_bg, &mut theme.status_warning.bg),
            ("status_error_fg", &self.status_error_fg, &mut theme.status_error.fg),
            ("status_error_bg", &self.status_error_bg, &mut theme.status_error.bg),
        ];
        for (key, value, slot) in overrides {
            if let Some(rgb) = color(key, value.as_ref())? {
                *slot = rgb;
            }
        }

        Ok(theme)
    }
}

/// Log filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Directory searched for `config.toml`.
///
/// `$VEDIT_CONFIG_DIR` wins over the platform config directory.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|p| p.join("vedit"))
}

/// Default config file path.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text, path)?;
        config.theme.to_theme()?;
        Ok(config)
    }

    /// Load from `explicit` if given, else from the default location if a
    /// file exists there, else return defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match config_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_empty_document_is_default() {
        let config = Config::from_toml("", Path::new("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.engine.tick(), Duration::from_millis(16));
        assert_eq!(config.engine.input_backoff(), Duration::from_millis(5));
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_partial_sections() {
        let text = r##"
[engine]
tick_ms = 0
alternate_screen = false

[theme]
status_warning_bg = "#ff8800"
"##;
        let config = Config::from_toml(text, Path::new("config.toml")).unwrap();
        assert!(!config.engine.alternate_screen);
        assert_eq!(config.engine.input_backoff_ms, 5);
        assert_eq!(config.engine.tick(), Duration::from_millis(1));

        let theme = config.theme.to_theme().unwrap();
        assert_eq!(theme.status_warning.bg, Rgb::new(0xFF, 0x88, 0x00));
        assert_eq!(theme.status_error, Theme::default().status_error);
    }

    #[test]
    fn test_background_applies_to_content_styles() {
        let theme = ThemeConfig {
            background: Some("#102030".to_string()),
            ..ThemeConfig::default()
        }
        .to_theme()
        .unwrap();
        assert_eq!(theme.text.bg, Rgb::new(0x10, 0x20, 0x30));
        assert_eq!(theme.tilde.bg, Rgb::new(0x10, 0x20, 0x30));
        assert_eq!(theme.status_info, Theme::default().status_info);
    }

    #[test]
    fn test_invalid_color() {
        let theme = ThemeConfig {
            gutter_fg: Some("grey".to_string()),
            ..ThemeConfig::default()
        };
        match theme.to_theme() {
            Err(ConfigError::InvalidColor { key, value }) => {
                assert_eq!(key, "gutter_fg");
                assert_eq!(value, "grey");
            }
            other => panic!("expected InvalidColor, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[log]\nfilter = \"vedit=trace\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log.filter, "vedit=trace");

        fs::write(&path, "[engine\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::Parse { .. })));

        fs::write(&path, "[theme]\ntext_fg = \"#12\"\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::InvalidColor { key: "text_fg", .. })
        ));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(Some(&missing)), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_path_ends_with_file_name() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }
}
