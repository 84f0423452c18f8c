use std::{fmt, fs, path::{Path, PathBuf}, str::FromStr, time::Duration};

use serde::Deserialize;

use crate::error::{ColorError, ConfigError};
use crate::GridInt;

pub const DEFAULT_CONFIG_PATH: &str = "snake.toml";
pub const DEFAULT_SNAKE_COLOR: &str = "#00ff88";

/// Widths at or below this get the compact grid.
pub const VIEWPORT_THRESHOLD: u32 = 768;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GridTier {
    Compact,
    Wide,
}

impl GridTier {
    pub fn from_viewport_width(width: u32) -> Self {
        if width <= VIEWPORT_THRESHOLD { GridTier::Compact } else { GridTier::Wide }
    }

    pub fn grid_size(self) -> GridInt {
        match self {
            GridTier::Compact => 20,
            GridTier::Wide => 25,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ColorError::Format(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(bad)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        Ok(Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// On-disk shape of `snake.toml`. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    tick_interval_ms: Option<u64>,
    countdown_interval_ms: Option<u64>,
    round_duration_secs: Option<u32>,
    snake_color: Option<String>,
    prefs_path: Option<PathBuf>,
    log_file: Option<PathBuf>,
    sound: Option<bool>,
    viewport_width: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub tick_interval: Duration,
    pub countdown_interval: Duration,
    pub round_duration: Option<u32>,
    pub snake_color: Rgb,
    pub prefs_path: PathBuf,
    pub log_file: Option<PathBuf>,
    pub sound: bool,
    pub viewport_width: Option<u32>,
    pub grid_tier: GridTier,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tick_interval: Duration::from_millis(150),
            countdown_interval: Duration::from_millis(1000),
            round_duration: None,
            snake_color: Rgb { r: 0x00, g: 0xff, b: 0x88 },
            prefs_path: PathBuf::from("snake-prefs.toml"),
            log_file: None,
            sound: true,
            viewport_width: None,
            grid_tier: GridTier::Wide,
        }
    }
}

impl Config {
    /// Loads `path`, or the default config file when it exists, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => PathBuf::from(DEFAULT_CONFIG_PATH),
            None => return Ok(Config::default()),
        };

        let text = fs::read_to_string(&path)
            .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        Config::parse(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path, source },
            other => other,
        })
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)
            .map_err(|source| ConfigError::Parse { path: PathBuf::new(), source })?;
        let defaults = Config::default();

        let snake_color = match raw.snake_color {
            Some(s) => s.parse::<Rgb>()?,
            None => defaults.snake_color,
        };

        let mut config = Config {
            tick_interval: raw.tick_interval_ms.map_or(defaults.tick_interval, Duration::from_millis),
            countdown_interval: raw.countdown_interval_ms.map_or(defaults.countdown_interval, Duration::from_millis),
            round_duration: raw.round_duration_secs.filter(|&secs| secs > 0),
            snake_color,
            prefs_path: raw.prefs_path.unwrap_or(defaults.prefs_path),
            log_file: raw.log_file,
            sound: raw.sound.unwrap_or(defaults.sound),
            viewport_width: raw.viewport_width,
            grid_tier: defaults.grid_tier,
        };

        if let Some(width) = config.viewport_width {
            config.grid_tier = GridTier::from_viewport_width(width);
        }

        Ok(config)
    }

    pub fn grid_size(&self) -> GridInt {
        self.grid_tier.grid_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_split_at_threshold() {
        assert_eq!(GridTier::from_viewport_width(320), GridTier::Compact);
        assert_eq!(GridTier::from_viewport_width(768), GridTier::Compact);
        assert_eq!(GridTier::from_viewport_width(769), GridTier::Wide);
        assert_eq!(GridTier::Compact.grid_size(), 20);
        assert_eq!(GridTier::Wide.grid_size(), 25);
    }

    #[test]
    fn color_parses_and_prints_hex() {
        let color: Rgb = "#00FF88".parse().unwrap();
        assert_eq!(color, Rgb { r: 0, g: 255, b: 0x88 });
        assert_eq!(color.to_string(), DEFAULT_SNAKE_COLOR);

        assert!("00ff88".parse::<Rgb>().is_err());
        assert!("#00ff8".parse::<Rgb>().is_err());
        assert!("#00ffgg".parse::<Rgb>().is_err());
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn parses_every_field() {
        let config = Config::parse(r##"
            tick_interval_ms = 100
            countdown_interval_ms = 500
            round_duration_secs = 60
            snake_color = "#ff0000"
            prefs_path = "prefs.toml"
            log_file = "snake.log"
            sound = false
            viewport_width = 600
        "##).unwrap();

        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.countdown_interval, Duration::from_millis(500));
        assert_eq!(config.round_duration, Some(60));
        assert_eq!(config.snake_color, Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(config.prefs_path, PathBuf::from("prefs.toml"));
        assert_eq!(config.log_file, Some(PathBuf::from("snake.log")));
        assert!(!config.sound);
        assert_eq!(config.grid_size(), 20);
    }

    #[test]
    fn zero_round_duration_means_untimed() {
        assert_eq!(Config::parse("round_duration_secs = 0").unwrap().round_duration, None);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(Config::parse("snake_color = \"red\""), Err(ConfigError::Color(_))));
        assert!(matches!(Config::parse("speed = 3"), Err(ConfigError::Parse { .. })));
    }
}
