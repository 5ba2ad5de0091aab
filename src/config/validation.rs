use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid backend origin scheme '{scheme}', expected 'http://' or 'https://'")]
    InvalidOriginScheme { scheme: String },

    #[error("Backend origin '{origin}' has no host")]
    OriginWithoutHost { origin: String },

    #[error("Backend origin '{origin}' must not carry a query or fragment")]
    OriginWithQuery { origin: String },

    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: String },

    #[error("download.max_polls must be at least 1")]
    InvalidMaxPolls,

    #[error("download.poll_interval must be positive")]
    ZeroPollInterval,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_backend(config)?;
    validate_download(config)?;
    Ok(())
}

fn validate_backend(config: &Config) -> Result<(), ValidationError> {
    let origin = &config.backend.origin;

    if !matches!(origin.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidOriginScheme {
            scheme: origin.scheme().to_string(),
        });
    }

    if origin.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::OriginWithoutHost {
            origin: origin.to_string(),
        });
    }

    if origin.query().is_some() || origin.fragment().is_some() {
        return Err(ValidationError::OriginWithQuery {
            origin: origin.to_string(),
        });
    }

    if config.backend.request_timeout.is_zero() {
        return Err(ValidationError::ZeroTimeout {
            field: "backend.request_timeout".to_string(),
        });
    }

    if config.backend.connect_timeout.is_zero() {
        return Err(ValidationError::ZeroTimeout {
            field: "backend.connect_timeout".to_string(),
        });
    }

    Ok(())
}

fn validate_download(config: &Config) -> Result<(), ValidationError> {
    if config.download.max_polls == 0 {
        return Err(ValidationError::InvalidMaxPolls);
    }

    if config.download.poll_interval.is_zero() {
        return Err(ValidationError::ZeroPollInterval);
    }

    if config.download.fetch_timeout.is_zero() {
        return Err(ValidationError::ZeroTimeout {
            field: "download.fetch_timeout".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::HumanDuration;
    use url::Url;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_origin_with_path_is_allowed() {
        let mut config = Config::default();
        config.backend.origin = Url::parse("https://example.com/api").unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_scheme() {
        let mut config = Config::default();
        config.backend.origin = Url::parse("ftp://example.com").unwrap();

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidOriginScheme { ref scheme }) if scheme == "ftp"
        ));
    }

    #[test]
    fn test_origin_with_query() {
        let mut config = Config::default();
        config.backend.origin = Url::parse("http://example.com/?token=abc").unwrap();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::OriginWithQuery { .. })));
    }

    #[test]
    fn test_zero_request_timeout() {
        let mut config = Config::default();
        config.backend.request_timeout = HumanDuration::from_secs(0);

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::ZeroTimeout { .. })));
    }

    #[test]
    fn test_zero_fetch_timeout() {
        let mut config = Config::default();
        config.download.fetch_timeout = HumanDuration::from_secs(0);

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::ZeroTimeout { ref field }) if field == "download.fetch_timeout"
        ));
    }

    #[test]
    fn test_zero_max_polls() {
        let mut config = Config::default();
        config.download.max_polls = 0;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::InvalidMaxPolls)));
    }
}
