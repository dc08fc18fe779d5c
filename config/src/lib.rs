//! # Configuration System
//!
//! Configuration management for the permission resolver.
//!
//! This crate provides:
//! - Configuration structures (level bounds, observability)
//! - Environment variable loading (12-factor app principles)
//! - Configuration file loading (TOML/YAML)
//! - Configuration precedence (env > file > defaults)
//! - Configuration validation

pub mod config;
pub mod file_loader;
pub mod loader;
pub mod precedence;
pub mod validation;

use std::path::Path;

pub use config::{
    Config, ConfigOverrides, LevelConfig, LevelOverrides, ObservabilityConfig,
    ObservabilityOverrides,
};
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml, load_from_yaml};
pub use loader::{load_from_env, load_overrides_from_env};
pub use precedence::{apply_overrides, merge_configs};
pub use validation::validate;
pub use validator::Validate;

/// Errors raised while assembling the effective configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    File(#[from] ConfigFileError),

    #[error("Failed to read environment: {0}")]
    Env(String),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Loads the effective configuration: defaults, then the optional file, then
/// the environment, validated as a whole.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file_config = match path {
        Some(path) => load_from_file(path)?,
        None => Config::default(),
    };
    let env_overrides = load_overrides_from_env().map_err(|e| ConfigError::Env(e.to_string()))?;

    let config = merge_configs(
        Config::default(),
        file_config,
        "file",
        &env_overrides,
        "env",
    );
    validate(&config)?;
    Ok(config)
}
