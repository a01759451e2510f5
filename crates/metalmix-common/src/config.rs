//! Mixer configuration loaded from TOML
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the reference tuning. Example:
//!
//! ```toml
//! log_level = "debug"
//!
//! [mixer]
//! countdown_seconds = 45.0
//!
//! [mixer.thresholds]
//! preset = "strict"
//! overkill_max_abs_clarity = 10.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid config syntax: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Threshold selection
// ---------------------------------------------------------------------------

/// Named revision of the classification thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPreset {
    /// The shipped tuning
    #[default]
    Standard,
    /// Earlier, tighter draft
    Strict,
}

/// Which threshold revision to use, plus optional per-field overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub preset: ThresholdPreset,
    pub boring_below_power: Option<f64>,
    pub decent_max_power: Option<f64>,
    pub decent_max_abs_clarity: Option<f64>,
    pub overkill_max_abs_clarity: Option<f64>,
}

// ---------------------------------------------------------------------------
// Presentation timing
// ---------------------------------------------------------------------------

/// Durations (seconds) of the scripted serve sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationTiming {
    /// How long the glass stays hidden once the vocalist grabs it
    pub glass_hide: f32,
    /// Number of frames in the vocalist's drink animation
    pub drink_frame_count: u32,
    /// Duration of one drink frame
    pub drink_frame_time: f32,
    /// Pause on the drink pose before the fade starts
    pub drink_hold: f32,
    /// Fade-to-black duration before the concert is revealed
    pub fade: f32,
    /// Delay before the extra vocalist appears on stage
    pub extra_vocalist_delay: f32,
}

impl Default for PresentationTiming {
    fn default() -> Self {
        Self {
            glass_hide: 2.0,
            drink_frame_count: 4,
            drink_frame_time: 0.15,
            drink_hold: 1.0,
            fade: 2.0,
            extra_vocalist_delay: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Mixer
// ---------------------------------------------------------------------------

/// Tuning for one mixing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Units added per second while the pour trigger is held
    pub units_per_second: f64,
    /// Glass capacity
    pub max_total_units: f64,
    /// Poured units that count as one full "factor" of an ingredient's effect
    pub units_per_factor: f64,
    /// Minimum fill fraction accepted by a manual serve
    pub serve_fill_threshold: f64,
    /// Time limit before the drink is forfeited as boring
    pub countdown_seconds: f64,
    pub thresholds: ThresholdConfig,
    pub timing: PresentationTiming,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            units_per_second: 100.0,
            max_total_units: 500.0,
            units_per_factor: 100.0,
            serve_fill_threshold: 0.70,
            countdown_seconds: 60.0,
            thresholds: ThresholdConfig::default(),
            timing: PresentationTiming::default(),
        }
    }
}

impl MixerConfig {
    /// Check that every value keeps the engine's arithmetic well-defined
    pub fn validate(&self) -> Result<()> {
        fn positive(field: &'static str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be a positive number, got {}", value),
                })
            }
        }

        positive("units_per_second", self.units_per_second)?;
        positive("max_total_units", self.max_total_units)?;
        positive("units_per_factor", self.units_per_factor)?;
        positive("countdown_seconds", self.countdown_seconds)?;

        if !(self.serve_fill_threshold > 0.0 && self.serve_fill_threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "serve_fill_threshold",
                reason: format!("must be in (0, 1], got {}", self.serve_fill_threshold),
            });
        }

        let t = &self.timing;
        for (field, value) in [
            ("timing.glass_hide", t.glass_hide),
            ("timing.drink_frame_time", t.drink_frame_time),
            ("timing.drink_hold", t.drink_hold),
            ("timing.fade", t.fade),
            ("timing.extra_vocalist_delay", t.extra_vocalist_delay),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be a non-negative duration, got {}", value),
                });
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Application-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub mixer: MixerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            mixer: MixerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.mixer.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
