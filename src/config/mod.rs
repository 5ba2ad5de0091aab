//! Configuration management for audiograb
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use audiograb::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Converting through: {}", config.backend.origin);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `AUDIOGRAB__<section>__<key>`
//!
//! Examples:
//! - `AUDIOGRAB__BACKEND__ORIGIN=http://10.0.0.5:8000`
//! - `AUDIOGRAB__BACKEND__REQUEST_TIMEOUT=45s`
//! - `AUDIOGRAB__CONVERSION__QUALITY=medium`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/audiograb.toml`.
//! This can be overridden using the `AUDIOGRAB_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{BackendConfig, Config, ConversionConfig, DownloadConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Failed to render configuration: {0}")]
    RenderError(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`AUDIOGRAB__*`)
    /// 2. TOML file (default: `config/audiograb.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (bad origin, zero timeouts, etc.)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Re-run validation, e.g. after command line overrides were applied
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
