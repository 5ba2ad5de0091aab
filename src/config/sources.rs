use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "AUDIOGRAB_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/audiograb.toml";
const ENV_PREFIX: &str = "AUDIOGRAB";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // AUDIOGRAB__BACKEND__ORIGIN -> backend.origin
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Quality;
    use crate::humanize::HumanDuration;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.backend.origin.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.backend.request_timeout, HumanDuration::from_secs(30));
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[backend]
origin = "http://10.0.0.5:9000"
request_timeout = "45s"
connect_timeout = "500ms"

[conversion]
quality = "medium"

[download]
output_dir = "/tmp/audio"
poll_interval = "1s"
max_polls = 5
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.backend.origin.port(), Some(9000));
        assert_eq!(config.backend.request_timeout, HumanDuration::from_secs(45));
        assert_eq!(config.backend.connect_timeout, HumanDuration::from_millis(500));
        assert_eq!(config.conversion.quality, Quality::Medium);
        assert_eq!(config.download.output_dir, PathBuf::from("/tmp/audio"));
        assert_eq!(config.download.max_polls, 5);
    }

    // Environment overrides are not exercised here: env::set_var is unsafe
    // under edition 2024 and races with parallel tests.

    #[test]
    fn test_malformed_origin_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[backend]\norigin = \"not a url\"\n").unwrap();

        assert!(load_from_sources(config_path).is_err());
    }
}
