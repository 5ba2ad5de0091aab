use crate::client::Quality;
use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Remote conversion backend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Scheme, host and port of the conversion service
    #[serde(default = "default_origin")]
    pub origin: Url,
    /// Deadline for one whole `/convert` exchange, body included
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

pub(crate) const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8000";

fn default_origin() -> Url {
    Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL")
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(30)
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("audiograb/{}", env!("CARGO_PKG_VERSION"))
}

/// Conversion request defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConversionConfig {
    #[serde(default)]
    pub quality: Quality,
}

/// Artifact download settings used by the `download` command
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Pause between polls while the backend is still processing
    #[serde(default = "default_poll_interval")]
    pub poll_interval: HumanDuration,
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
    /// Deadline for one artifact GET, body included
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: HumanDuration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            poll_interval: default_poll_interval(),
            max_polls: default_max_polls(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_poll_interval() -> HumanDuration {
    HumanDuration::from_secs(3)
}

// The backend quotes 15-30 seconds; 20 polls at 3s leaves headroom.
fn default_max_polls() -> u32 {
    20
}

fn default_fetch_timeout() -> HumanDuration {
    HumanDuration::from_secs(300)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.backend.origin.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(
            config.backend.request_timeout.as_duration(),
            Duration::from_secs(30)
        );
        assert_eq!(config.conversion.quality, Quality::High);
        assert_eq!(config.download.max_polls, 20);
        assert_eq!(config.download.fetch_timeout, HumanDuration::from_secs(300));
        assert!(config.backend.user_agent.starts_with("audiograb/"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[backend]
origin = "https://convert.example.com"

[conversion]
quality = "low"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.origin.host_str(), Some("convert.example.com"));
        assert_eq!(config.backend.request_timeout, HumanDuration::from_secs(30));
        assert_eq!(config.conversion.quality, Quality::Low);
        assert_eq!(config.download.poll_interval, HumanDuration::from_secs(3));
    }
}
