//! # Configuration Validation
//!
//! Provides validation for all configuration structures using the `validator` crate.

use crate::config::Config;
use validator::Validate;

/// Validate configuration structure.
///
/// ## Validation Rules
/// ### Levels
/// - `max_level`: 0-32
/// - `min_level` must not exceed `max_level`
/// - `default_required_level` must lie in `[min_level, max_level]`
///
/// ### Observability
/// - `logging_level`: must be "trace", "debug", "info", "warn", or "error"
pub fn validate(config: &Config) -> Result<(), validator::ValidationErrors> {
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_inverted_level_bounds() {
        let mut config = Config::default();
        config.levels.min_level = 3;
        config.levels.max_level = 2;
        config.levels.default_required_level = 2;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_default_level_out_of_range() {
        let mut config = Config::default();
        config.levels.default_required_level = 9;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_max_level_too_high() {
        let mut config = Config::default();
        config.levels.max_level = 33;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_invalid_logging_level() {
        let mut config = Config::default();
        config.observability.logging_level = "verbose".to_string();
        assert!(validate(&config).is_err());
    }
}
