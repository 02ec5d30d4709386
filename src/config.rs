//! Configuration file support.
//!
//! Editor thresholds, zoom limits, timeline scale, history sizes, log level
//! and keybindings can be read from a JSON file. Every section has defaults,
//! so a partial file loads.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PIXELS_PER_SECOND, DEFAULT_SEGMENT_LENGTH, HANDLE_HIT_RADIUS, MIN_BOX_SIZE,
    MIN_DRAG_DISTANCE, POLYGON_CLOSE_DISTANCE, SUGGESTION_TIMEOUT_SECS, UNDO_HISTORY_SIZE, zoom,
};
use crate::keybindings::KeyBindings;
use crate::model::ValidationRules;

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Log level setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Interaction thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum box width/height in medium units
    pub min_box_size: f32,
    /// Screen pixels within which a click closes a polygon
    pub polygon_close_distance: f32,
    /// Screen pixels of movement before a press becomes a drag
    pub min_drag_distance: f32,
    /// Screen pixel radius for grabbing handles
    pub handle_hit_radius: f32,
    /// Seconds covered by a segment added at the playhead
    pub default_segment_length: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_box_size: MIN_BOX_SIZE,
            polygon_close_distance: POLYGON_CLOSE_DISTANCE,
            min_drag_distance: MIN_DRAG_DISTANCE,
            handle_hit_radius: HANDLE_HIT_RADIUS,
            default_segment_length: DEFAULT_SEGMENT_LENGTH,
        }
    }
}

impl Thresholds {
    /// Store validation rules derived from these thresholds.
    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            min_box_size: self.min_box_size,
        }
    }
}

/// Zoom limits for spatial and temporal viewports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
    /// Multiplicative step for one zoom in/out
    pub factor: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: zoom::MIN,
            max: zoom::MAX,
            factor: zoom::FACTOR,
        }
    }
}

impl ZoomLimits {
    pub fn clamp(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min, self.max)
    }
}

/// Timeline display settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Pixels per second at zoom 1
    pub pixels_per_second: f32,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub zoom: ZoomLimits,

    #[serde(default)]
    pub timeline: TimelineSettings,

    /// Number of undo steps kept per editor
    #[serde(default = "default_undo_history")]
    pub undo_history: usize,

    /// Seconds before a pending suggestion request is dropped
    #[serde(default = "default_suggestion_timeout")]
    pub suggestion_timeout_secs: u64,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub keybindings: KeyBindings,
}

fn default_undo_history() -> usize {
    UNDO_HISTORY_SIZE
}

fn default_suggestion_timeout() -> u64 {
    SUGGESTION_TIMEOUT_SECS
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            thresholds: Thresholds::default(),
            zoom: ZoomLimits::default(),
            timeline: TimelineSettings::default(),
            undo_history: default_undo_history(),
            suggestion_timeout_secs: default_suggestion_timeout(),
            log_level: LogLevel::default(),
            keybindings: KeyBindings::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "config.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("mmat").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("mmat")
                    .join(Self::default_filename())
            })
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn default_path() -> Option<PathBuf> {
        None
    }

    /// Load `path` if given, else the default path; fall back to defaults
    /// when the file is missing or broken.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
