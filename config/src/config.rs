//! # Configuration Structures
//!
//! This module defines the configuration structures of the permission
//! resolver.
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization
//! - Use `validator` for input validation

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main configuration structure for the permission resolver.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Aggregates the host level bounds used by level-based fallbacks and the
/// observability settings.
///
/// ## Usage
/// ```rust,no_run
/// use config::Config;
///
/// let config = Config::default();
/// println!("Max level: {}", config.levels.max_level);
/// ```
///
/// ## Fields
/// - `levels`: Host permission level bounds
/// - `observability`: Logging and metrics settings
///
/// ## Validation
/// All nested configurations must pass their own validation rules.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Config {
    /// Host permission level bounds
    #[serde(default)]
    #[validate(nested)]
    pub levels: LevelConfig,

    /// Observability configuration (logging, metrics)
    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

/// Host permission level bounds.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Level-based fallbacks clamp the level requested by a caller into
/// `[min_level, max_level]` before asking the host.
///
/// ## Fields
/// - `min_level`: Lowest valid level (default: 0)
/// - `max_level`: Highest valid level (default: 4)
/// - `default_required_level`: Level required when a caller asks for the
///   host default (default: 4)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[validate(schema(function = "validate_level_bounds"))]
pub struct LevelConfig {
    /// Lowest valid level
    #[serde(default = "default_min_level")]
    pub min_level: u8,

    /// Highest valid level
    #[serde(default = "default_max_level")]
    #[validate(range(max = 32))]
    pub max_level: u8,

    /// Level required by default
    #[serde(default = "default_required_level")]
    pub default_required_level: u8,
}

impl LevelConfig {
    /// Clamps a caller-supplied level into the configured range.
    pub fn clamp(&self, level: i32) -> u8 {
        level
            .max(i32::from(self.min_level))
            .min(i32::from(self.max_level)) as u8
    }
}

fn default_min_level() -> u8 {
    0
}

fn default_max_level() -> u8 {
    4
}

fn default_required_level() -> u8 {
    4
}

fn validate_level_bounds(levels: &LevelConfig) -> Result<(), validator::ValidationError> {
    if levels.min_level > levels.max_level {
        return Err(validator::ValidationError::new("min_level must not exceed max_level"));
    }
    if levels.default_required_level < levels.min_level
        || levels.default_required_level > levels.max_level
    {
        return Err(validator::ValidationError::new("default_required_level out of range"));
    }
    Ok(())
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            min_level: default_min_level(),
            max_level: default_max_level(),
            default_required_level: default_required_level(),
        }
    }
}

/// Observability configuration.
///
/// ## Fields
/// - `logging_level`: Log level (default: "info")
/// - `metrics_enabled`: Record resolution metrics (default: true)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    /// Logging level
    #[serde(default = "default_logging_level")]
    #[validate(custom(function = "validate_logging_level"))]
    pub logging_level: String,

    /// Record resolution metrics
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_logging_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn validate_logging_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid logging level")),
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            logging_level: default_logging_level(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// Fields explicitly set by a configuration layer.
///
/// Unlike [`Config`], every field is optional, so a layer that sets a value
/// equal to its default still overrides the layers below it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub levels: LevelOverrides,
    pub observability: ObservabilityOverrides,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelOverrides {
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
    pub default_required_level: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservabilityOverrides {
    pub logging_level: Option<String>,
    pub metrics_enabled: Option<bool>,
}
