//! # Configuration Precedence
//!
//! Merges configuration from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. Environment variables (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)
//!
//! The file layer is a full [`Config`]; its fields override the defaults
//! where they differ. The environment layer is a [`ConfigOverrides`] holding
//! only the variables that were set, and every set field wins.

use std::fmt::Display;

use crate::config::{Config, ConfigOverrides, LevelConfig, ObservabilityConfig};

/// Merge configuration sources with precedence.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Config, load_from_file, load_overrides_from_env, merge_configs};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let from_file = load_from_file(Path::new("permissions.toml"))?;
///     let from_env = load_overrides_from_env()?;
///
///     let _config = merge_configs(Config::default(), from_file, "file", &from_env, "env");
///     Ok(())
/// }
/// ```
pub fn merge_configs(
    defaults: Config,
    file_config: Config,
    file_source_name: &str,
    env_overrides: &ConfigOverrides,
    env_source_name: &str,
) -> Config {
    let config = merge_with_logging(defaults, &file_config, file_source_name);
    apply_overrides(config, env_overrides, env_source_name)
}

/// Applies every field set in `overrides` on top of `base`.
pub fn apply_overrides(mut base: Config, overrides: &ConfigOverrides, source_name: &str) -> Config {
    let mut changes = Vec::new();
    let levels = &overrides.levels;
    let observability = &overrides.observability;

    override_field(
        &mut base.levels.min_level,
        levels.min_level,
        "levels.min_level",
        &mut changes,
    );
    override_field(
        &mut base.levels.max_level,
        levels.max_level,
        "levels.max_level",
        &mut changes,
    );
    override_field(
        &mut base.levels.default_required_level,
        levels.default_required_level,
        "levels.default_required_level",
        &mut changes,
    );
    override_field(
        &mut base.observability.logging_level,
        observability.logging_level.clone(),
        "observability.logging_level",
        &mut changes,
    );
    override_field(
        &mut base.observability.metrics_enabled,
        observability.metrics_enabled,
        "observability.metrics_enabled",
        &mut changes,
    );

    if !changes.is_empty() {
        tracing::info!("Configuration from {}: {:?}", source_name, changes);
    }

    base
}

fn override_field<T: PartialEq + Display>(
    slot: &mut T,
    value: Option<T>,
    name: &str,
    changes: &mut Vec<String>,
) {
    let Some(value) = value else {
        return;
    };
    if *slot != value {
        changes.push(format!("{name} = {value}"));
        *slot = value;
    }
}

fn merge_with_logging(mut base: Config, override_config: &Config, source_name: &str) -> Config {
    let mut changes = Vec::new();

    merge_levels(&mut base.levels, &override_config.levels, &mut changes);
    merge_observability(
        &mut base.observability,
        &override_config.observability,
        &mut changes,
    );

    if !changes.is_empty() {
        tracing::info!("Configuration from {}: {:?}", source_name, changes);
    }

    base
}

fn merge_levels(base: &mut LevelConfig, override_config: &LevelConfig, changes: &mut Vec<String>) {
    let defaults = LevelConfig::default();

    if override_config.min_level != defaults.min_level
        && override_config.min_level != base.min_level
    {
        changes.push(format!("levels.min_level = {}", override_config.min_level));
        base.min_level = override_config.min_level;
    }
    if override_config.max_level != defaults.max_level
        && override_config.max_level != base.max_level
    {
        changes.push(format!("levels.max_level = {}", override_config.max_level));
        base.max_level = override_config.max_level;
    }
    if override_config.default_required_level != defaults.default_required_level
        && override_config.default_required_level != base.default_required_level
    {
        changes.push(format!(
            "levels.default_required_level = {}",
            override_config.default_required_level
        ));
        base.default_required_level = override_config.default_required_level;
    }
}

fn merge_observability(
    base: &mut ObservabilityConfig,
    override_config: &ObservabilityConfig,
    changes: &mut Vec<String>,
) {
    let defaults = ObservabilityConfig::default();

    if override_config.logging_level != defaults.logging_level
        && override_config.logging_level != base.logging_level
    {
        changes.push(format!(
            "observability.logging_level = {}",
            override_config.logging_level
        ));
        base.logging_level.clone_from(&override_config.logging_level);
    }
    if override_config.metrics_enabled != defaults.metrics_enabled
        && override_config.metrics_enabled != base.metrics_enabled
    {
        changes.push(format!(
            "observability.metrics_enabled = {}",
            override_config.metrics_enabled
        ));
        base.metrics_enabled = override_config.metrics_enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LevelOverrides, ObservabilityOverrides};

    #[test]
    fn test_merge_configs_precedence() {
        let file_config = Config {
            levels: LevelConfig {
                max_level: 3,
                default_required_level: 3,
                ..Default::default()
            },
            ..Default::default()
        };

        let env_overrides = ConfigOverrides {
            levels: LevelOverrides {
                default_required_level: Some(2),
                ..Default::default()
            },
            observability: ObservabilityOverrides {
                logging_level: Some("trace".to_string()),
                ..Default::default()
            },
        };

        let merged = merge_configs(
            Config::default(),
            file_config,
            "file",
            &env_overrides,
            "env",
        );

        assert_eq!(merged.levels.max_level, 3);
        assert_eq!(merged.levels.default_required_level, 2);
        assert_eq!(merged.observability.logging_level, "trace");
    }

    #[test]
    fn test_unset_env_does_not_erase_file_values() {
        let file_config = Config {
            observability: ObservabilityConfig {
                metrics_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = merge_configs(
            Config::default(),
            file_config,
            "file",
            &ConfigOverrides::default(),
            "env",
        );

        assert!(!merged.observability.metrics_enabled);
    }

    #[test]
    fn test_env_value_equal_to_default_beats_file() {
        let file_config = Config {
            levels: LevelConfig {
                max_level: 3,
                default_required_level: 3,
                ..Default::default()
            },
            observability: ObservabilityConfig {
                logging_level: "debug".to_string(),
                metrics_enabled: false,
            },
        };

        let env_overrides = ConfigOverrides {
            levels: LevelOverrides {
                max_level: Some(4),
                ..Default::default()
            },
            observability: ObservabilityOverrides {
                logging_level: Some("info".to_string()),
                metrics_enabled: Some(true),
            },
        };

        let merged = merge_configs(
            Config::default(),
            file_config,
            "file",
            &env_overrides,
            "env",
        );

        assert_eq!(merged.levels.max_level, 4);
        assert_eq!(merged.levels.default_required_level, 3);
        assert_eq!(merged.observability.logging_level, "info");
        assert!(merged.observability.metrics_enabled);
    }
}
