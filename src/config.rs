use std::str::FromStr;
use std::sync;

use hex_literal::hex;
use lazy_static::lazy_static;
use serde_derive::Deserialize;

/// RGBA colour, written in configuration files as eight hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

macro_rules! color {
    ($rgba:literal) => {
        Color::bytes(hex!($rgba))
    };
}

impl Color {
    pub const fn bytes(rgba: [u8; 4]) -> Color {
        Color { r: rgba[0], g: rgba[1], b: rgba[2], a: rgba[3] }
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Color, ConfigError> {
        let digits = s.trim().trim_start_matches('#');

        if digits.len() != 8 || !digits.is_ascii() {
            return Err(ConfigError::Invalid(format!("colour '{}' should be eight hex digits", s)));
        }

        let mut rgba = [0u8; 4];
        for (i, c) in rgba.iter_mut().enumerate() {
            *c = u8::from_str_radix(&digits[i*2..i*2+2], 16)
                .map_err(|e| ConfigError::Invalid(format!("colour '{}': {}", s, e)))?;
        }

        Ok(Color::bytes(rgba))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cols: u32, /* bytes per row */
    pub rows: u32, /* rows per page */

    pub live_selection_color: Color,
    pub tag_color: Color,
    pub mark_color: Color,
    pub caret_color: Color,

    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cols: 16,
            rows: 16,

            live_selection_color: color!("ff0000ff"),
            tag_color: color!("ff0000ff"),
            mark_color: color!("ffff00ff"),
            caret_color: color!("ffffffff"),

            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Xdg(xdg::BaseDirectoriesError),
    Invalid(String),
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml(&text)
    }

    /// Reads `$XDG_CONFIG_HOME/hexlane/config.toml`, or returns the defaults
    /// if there is no such file.
    pub fn load() -> Result<Config, ConfigError> {
        let dirs = xdg::BaseDirectories::with_prefix("hexlane").map_err(ConfigError::Xdg)?;

        match dirs.find_config_file("config.toml") {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading configuration");
                Self::load_from(&path)
            },
            None => Ok(Config::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::Invalid(format!("page geometry {}x{} must be at least 1x1", self.cols, self.rows)));
        }

        if tracing::Level::from_str(&self.log_level).is_err() {
            return Err(ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)));
        }

        Ok(())
    }

    pub fn tracing_level(&self) -> tracing::Level {
        tracing::Level::from_str(&self.log_level).unwrap_or(tracing::Level::INFO)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Couldn't read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "Malformed configuration: {}", e),
            ConfigError::Xdg(e) => write!(f, "Couldn't locate configuration directory: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
}

lazy_static! {
    static ref INSTANCE: sync::RwLock<Config> = sync::RwLock::new(Config::default());
}

pub fn get() -> sync::RwLockReadGuard<'static, Config> {
    INSTANCE.read().unwrap_or_else(sync::PoisonError::into_inner)
}

pub fn set() -> sync::RwLockWriteGuard<'static, Config> {
    INSTANCE.write().unwrap_or_else(sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_from_empty_file() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
        assert_eq!((Config::default().cols, Config::default().rows), (16, 16));
    }

    #[test]
    fn overrides() {
        let config = Config::from_toml(r##"
            cols = 8
            rows = 4
            tag_color = "#00ff0080"
            log_level = "debug"
        "##).unwrap();

        assert_eq!(config.cols, 8);
        assert_eq!(config.rows, 4);
        assert_eq!(config.tag_color, Color { r: 0, g: 0xff, b: 0, a: 0x80 });
        assert_eq!(config.live_selection_color, color!("ff0000ff"));
        assert_eq!(config.tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn rejects_bad_values() {
        assert_matches!(Config::from_toml("cols = 0"), Err(ConfigError::Invalid(_)));
        assert_matches!(Config::from_toml("log_level = \"loud\""), Err(ConfigError::Invalid(_)));
        assert_matches!(Config::from_toml("tag_color = \"red\""), Err(ConfigError::Parse(_)));
        assert_matches!(Config::from_toml("colour = 1"), Err(ConfigError::Parse(_)));
    }

    #[test]
    fn color_round_trip_text() {
        assert_eq!(color!("8891efff").to_string(), "8891efff");
    }
}
