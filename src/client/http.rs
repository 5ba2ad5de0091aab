//! HTTP client for the conversion backend

use super::classify::{TransportFailure, classify};
use super::error::{ClientInitError, ConversionError, ErrorKind};
use super::models::{
    ConversionRequest, ConversionResult, GENERIC_FAILURE, Quality, ResolvedDownload,
    extract_detail,
};
use super::resolve;
use crate::config::Config;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    /// Deadline for the whole exchange, body included
    pub request_timeout: Duration,
    pub user_agent: String,
    pub quality: Quality,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("audiograb/{}", env!("CARGO_PKG_VERSION")),
            quality: Quality::High,
        }
    }
}

impl ClientSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            connect_timeout: config.backend.connect_timeout.as_duration(),
            request_timeout: config.backend.request_timeout.as_duration(),
            user_agent: config.backend.user_agent.clone(),
            quality: config.conversion.quality,
        }
    }
}

/// Submits conversion jobs to one backend origin.
///
/// Single attempt per call: retries are left to the caller. Overlapping
/// calls on one instance are not coordinated here; `ConversionSession`
/// serializes them.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    client: Client,
    origin: Url,
    origin_label: String,
    settings: ClientSettings,
}

impl ConversionClient {
    /// Create a new client for `origin`
    pub fn new(origin: Url, settings: ClientSettings) -> Result<Self, ClientInitError> {
        if !matches!(origin.scheme(), "http" | "https") || origin.cannot_be_a_base() {
            return Err(ClientInitError::UnsupportedOrigin(origin.to_string()));
        }

        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(&settings.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        let origin_label = resolve::origin_label(&origin);

        Ok(Self {
            client,
            origin,
            origin_label,
            settings,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientInitError> {
        Self::new(
            config.backend.origin.clone(),
            ClientSettings::from_config(config),
        )
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Underlying connection pool, shared with the artifact fetcher
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Submit `source_url` at the configured quality
    pub async fn convert(&self, source_url: &str) -> Result<ResolvedDownload, ConversionError> {
        self.convert_with_quality(source_url, self.settings.quality)
            .await
    }

    pub async fn convert_with_quality(
        &self,
        source_url: &str,
        quality: Quality,
    ) -> Result<ResolvedDownload, ConversionError> {
        let request = ConversionRequest::new(source_url, quality)
            .ok_or_else(|| ConversionError::new(ErrorKind::EmptyInput))?;

        let endpoint = resolve::endpoint(&self.origin, "convert")
            .map_err(|e| ConversionError::new(ErrorKind::Unknown(e.to_string())))?;

        info!(source_url = %request.source_url, quality = %quality, "Submitting conversion");

        let timeout = self.settings.request_timeout;
        let (status, body) = match tokio::time::timeout(timeout, self.exchange(endpoint, &request))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(?timeout, "Conversion request timed out");
                let failure = TransportFailure::elapsed(timeout, &self.origin_label);
                return Err(ConversionError::new(classify(&failure)));
            }
        };

        if status == StatusCode::OK {
            self.resolve_success(&body)
        } else {
            Err(self.rejection(status, &body))
        }
    }

    /// Send the request and read the whole body
    async fn exchange(
        &self,
        endpoint: Url,
        request: &ConversionRequest,
    ) -> Result<(StatusCode, Bytes), ConversionError> {
        debug!(%endpoint, "Starting conversion request");

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        debug!(status = status.as_u16(), size = body.len(), "Conversion response received");

        Ok((status, body))
    }

    fn transport_error(&self, err: reqwest::Error) -> ConversionError {
        let failure = TransportFailure::from_reqwest(&err, &self.origin_label);
        let kind = classify(&failure);
        warn!(code = kind.code(), error = %failure.message, "Conversion transport failure");
        ConversionError::new(kind).with_source(err)
    }

    fn resolve_success(&self, body: &[u8]) -> Result<ResolvedDownload, ConversionError> {
        let malformed = || ConversionError::new(ErrorKind::MalformedResponse).with_status(StatusCode::OK);

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            warn!(error = %e, "Conversion response is not JSON");
            malformed()
        })?;

        let result = ConversionResult::from_body(&value).ok_or_else(|| {
            warn!("Conversion response has no usable download_url");
            malformed()
        })?;

        let url = resolve::resolve_download(&self.origin, &result.download_path).ok_or_else(|| {
            warn!(
                download_path = %result.download_path,
                "download_url does not resolve under the backend origin"
            );
            malformed()
        })?;

        info!(download_url = %url, status = ?result.status, "Conversion accepted");

        Ok(ResolvedDownload {
            url,
            status: result.status,
            message: result.message,
            estimated_wait_time: result.estimated_wait_time,
        })
    }

    fn rejection(&self, status: StatusCode, body: &[u8]) -> ConversionError {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .as_ref()
            .and_then(extract_detail)
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());

        warn!(status = status.as_u16(), detail = %message, "Conversion rejected by backend");

        ConversionError::new(ErrorKind::BackendRejected(message)).with_status(status)
    }
}
