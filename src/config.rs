//! Configuration data structures and TOML parsing.
//!
//! Every key is optional; missing thresholds fall back to the global section
//! and then to the built-in defaults. Example:
//!
//! ```toml
//! [global]
//! log_level = "info"
//!
//! [global.tap]
//! max_distance = 10.0
//! max_duration = 300
//!
//! [global.long_press]
//! duration = 500
//! max_distance = 10.0
//!
//! [global.swipe]
//! min_distance = 50.0
//! min_velocity = 0.3
//! axes = ["up", "down", "left", "right"]
//!
//! [global.pinch]
//! min_scale_delta = 0.1
//!
//! [surface.carousel.swipe]
//! axes = ["left", "right"]
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::geometry::{Direction, Timestamp};
use crate::policy::{LongPressPolicy, PinchPolicy, SwipePolicy, TapPolicy, ThresholdPolicy};

/// Top-level error type used throughout the crate.
#[derive(Debug, Error)]
pub enum TouchgestError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    #[error("Invalid threshold {field} = {value}: must be finite and non-negative")]
    InvalidThreshold { field: &'static str, value: f64 },

    #[error(
        "tap.max_duration ({tap_max_duration} ms) must be less than \
         long_press.duration ({long_press_duration} ms)"
    )]
    OverlappingWindows {
        tap_max_duration: Timestamp,
        long_press_duration: Timestamp,
    },

    #[error("Invalid policy for surface '{surface}': {source}")]
    InvalidSurface {
        surface: String,
        source: Box<TouchgestError>,
    },

    #[error("Failed to read trace {path}: {source}")]
    TraceReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Trace line {line}: {message}")]
    TraceParseError { line: usize, message: String },
}

/// Generate a raw (all-optional) section plus its merge and resolve steps.
macro_rules! policy_section {
    ($raw:ident => $validated:ident { $($field:ident: $ty:ty),+ $(,)? }) => {
        #[derive(Debug, Deserialize, Default, Clone)]
        #[serde(default)]
        struct $raw {
            $($field: Option<$ty>,)+
        }

        impl $raw {
            fn merge_with_fallback(&self, fallback: &$raw) -> $raw {
                $raw {
                    $($field: self.$field.clone().or_else(|| fallback.$field.clone()),)+
                }
            }

            fn resolve(self, defaults: $validated) -> $validated {
                $validated {
                    $($field: self.$field.unwrap_or(defaults.$field),)+
                }
            }
        }
    };
}

policy_section!(RawTap => TapPolicy { max_distance: f64, max_duration: Timestamp });
policy_section!(RawLongPress => LongPressPolicy { duration: Timestamp, max_distance: f64 });
policy_section!(RawSwipe => SwipePolicy {
    min_distance: f64,
    min_velocity: f64,
    axes: BTreeSet<Direction>,
});
policy_section!(RawPinch => PinchPolicy { min_scale_delta: f64 });

/// Threshold sections shared by `[global]` and `[surface.<name>]`.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
struct RawPolicy {
    tap: RawTap,
    long_press: RawLongPress,
    swipe: RawSwipe,
    pinch: RawPinch,
}

impl RawPolicy {
    fn merge_with_fallback(&self, fallback: &RawPolicy) -> RawPolicy {
        RawPolicy {
            tap: self.tap.merge_with_fallback(&fallback.tap),
            long_press: self.long_press.merge_with_fallback(&fallback.long_press),
            swipe: self.swipe.merge_with_fallback(&fallback.swipe),
            pinch: self.pinch.merge_with_fallback(&fallback.pinch),
        }
    }

    fn into_validated(self) -> Result<ThresholdPolicy, TouchgestError> {
        let defaults = ThresholdPolicy::default();
        ThresholdPolicy {
            tap: self.tap.resolve(defaults.tap),
            long_press: self.long_press.resolve(defaults.long_press),
            swipe: self.swipe.resolve(defaults.swipe),
            pinch: self.pinch.resolve(defaults.pinch),
        }
        .validate()
    }
}

/// The `[global]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawGlobal {
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(flatten)]
    policy: RawPolicy,
}

/// Root of the TOML config file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    global: RawGlobal,
    surface: HashMap<String, RawPolicy>,
}

/// Top-level parsed configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: Option<String>,
    pub policy: ThresholdPolicy,
    pub surfaces: HashMap<String, ThresholdPolicy>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            policy: ThresholdPolicy::default(),
            surfaces: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Policy for a named surface, or the global policy for `None`.
    ///
    /// Returns `None` for a surface name that has no section.
    pub fn policy_for(&self, surface: Option<&str>) -> Option<&ThresholdPolicy> {
        match surface {
            Some(name) => self.surfaces.get(name),
            None => Some(&self.policy),
        }
    }
}

/// Parse TOML config text. `path` is only used in error messages.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<AppConfig, TouchgestError> {
    let raw: RawConfig = toml::from_str(contents).map_err(|e| TouchgestError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut surfaces = HashMap::new();
    for (name, raw_surface) in &raw.surface {
        let policy = raw_surface
            .merge_with_fallback(&raw.global.policy)
            .into_validated()
            .map_err(|e| TouchgestError::InvalidSurface {
                surface: name.clone(),
                source: Box::new(e),
            })?;
        debug!("Surface '{name}' policy: {policy:?}");
        surfaces.insert(name.clone(), policy);
    }

    Ok(AppConfig {
        log_level: raw.global.log_level.unwrap_or_else(|| "info".to_string()),
        log_file: raw.global.log_file,
        policy: raw.global.policy.into_validated()?,
        surfaces,
    })
}

/// Parse a TOML config file and return the fully resolved `AppConfig`.
pub fn parse_config_file(path: &Path) -> Result<AppConfig, TouchgestError> {
    let contents = fs::read_to_string(path).map_err(|e| TouchgestError::ConfigReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config_str(&contents, path)
}
