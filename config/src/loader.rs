//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles.
//!
//! # Naming Convention
//! - `PR_*`: Permission resolver settings
//! - `OB_*`: Observability settings

use crate::config::{Config, ConfigOverrides, LevelOverrides, ObservabilityOverrides};
use crate::precedence::apply_overrides;
use std::env;

/// Load configuration from environment variables.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Loads configuration from environment variables. Unset variables fall back
/// to defaults; a variable that is set but cannot be parsed is an error.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_env()?;
///     println!("Max level: {}", config.levels.max_level);
///     Ok(())
/// }
/// ```
///
/// ## Environment Variables
/// ### Level Settings (`PR_*`)
/// - `PR_MIN_LEVEL`: Lowest valid level (default: 0)
/// - `PR_MAX_LEVEL`: Highest valid level (default: 4)
/// - `PR_DEFAULT_REQUIRED_LEVEL`: Level required by default (default: 4)
///
/// ### Observability Settings (`OB_*`)
/// - `OB_LOGGING_LEVEL`: Logging level (trace/debug/info/warn/error, default:
///   "info")
/// - `OB_METRICS_ENABLED`: Record resolution metrics (true/false, default:
///   true)
pub fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    let overrides = load_overrides_from_env()?;
    Ok(apply_overrides(Config::default(), &overrides, "env"))
}

/// Reads only the environment variables that are set.
///
/// Used by [`crate::load`] so that a variable set to its default value still
/// takes precedence over the configuration file.
pub fn load_overrides_from_env() -> Result<ConfigOverrides, Box<dyn std::error::Error>> {
    Ok(ConfigOverrides {
        levels: LevelOverrides {
            min_level: parse_env("PR_MIN_LEVEL")?,
            max_level: parse_env("PR_MAX_LEVEL")?,
            default_required_level: parse_env("PR_DEFAULT_REQUIRED_LEVEL")?,
        },
        observability: ObservabilityOverrides {
            logging_level: env::var("OB_LOGGING_LEVEL").ok(),
            metrics_enabled: parse_env("OB_METRICS_ENABLED")?,
        },
    })
}

fn parse_env<T>(key: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("{key}: {e}").into()),
        Err(_) => Ok(None),
    }
}
