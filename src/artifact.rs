//! Fetching the produced audio file
//!
//! The backend answers `/convert` before the file exists; `GET` on the
//! resolved download URL returns 404 until processing finishes. `fetch` makes
//! a single attempt and reports that case as [`ArtifactError::NotReady`];
//! `wait_for` polls only through that case.

use bytes::Bytes;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::{
    ConversionClient, ErrorKind, ResolvedDownload, TransportFailure, classify, extract_detail,
    origin_label,
};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("file not ready: {0}")]
    NotReady(String),

    #[error("download rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    Transport(ErrorKind),

    #[error("file still not ready after {attempts} attempts: {last}")]
    GaveUp { attempts: u32, last: String },

    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ArtifactError>;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(300);

const NOT_READY_FALLBACK: &str = "the file might still be processing or has expired";

/// Downloaded audio body with its advertised metadata
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Bytes,
    pub content_type: Option<mime::Mime>,
    /// File name suggested by `Content-Disposition`
    pub file_name: Option<String>,
}

impl Artifact {
    pub fn is_audio(&self) -> bool {
        self.content_type
            .as_ref()
            .is_some_and(|media| media.type_() == mime::AUDIO)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &self.bytes).await?;
        info!(path = %path.display(), size = self.bytes.len(), "Artifact saved");
        Ok(())
    }
}

/// Fetches artifacts from the conversion backend
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: Client,
    origin_label: String,
    timeout: Duration,
}

impl ArtifactFetcher {
    /// Reuse the conversion client's connection pool, with
    /// [`DEFAULT_FETCH_TIMEOUT`] as the per-GET deadline
    pub fn from_client(client: &ConversionClient) -> Self {
        Self {
            client: client.http().clone(),
            origin_label: origin_label(client.origin()),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Deadline for one GET, body included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Single GET of the artifact
    pub async fn fetch(&self, download: &ResolvedDownload) -> Result<Artifact> {
        debug!(url = %download.url, "Fetching artifact");

        let exchange = async {
            let response = self
                .client
                .get(download.url.clone())
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| self.transport_error(&e))?;

            let status = response.status();
            let content_type = header_str(&response, CONTENT_TYPE.as_str())
                .and_then(|value| value.parse::<mime::Mime>().ok());
            let file_name = header_str(&response, CONTENT_DISPOSITION.as_str())
                .and_then(|value| parse_disposition_filename(&value));
            let bytes = response.bytes().await.map_err(|e| self.transport_error(&e))?;

            Ok::<_, ArtifactError>((status, content_type, file_name, bytes))
        };

        let (status, content_type, file_name, bytes) =
            match tokio::time::timeout(self.timeout, exchange).await {
                Ok(result) => result?,
                Err(_) => {
                    let failure = TransportFailure::elapsed(self.timeout, &self.origin_label);
                    return Err(ArtifactError::Transport(classify(&failure)));
                }
            };

        match status {
            StatusCode::OK => {
                let artifact = Artifact {
                    bytes,
                    content_type,
                    file_name,
                };
                if !artifact.is_audio() {
                    warn!(content_type = ?artifact.content_type, "Artifact is not advertised as audio");
                }
                Ok(artifact)
            }
            StatusCode::NOT_FOUND => Err(ArtifactError::NotReady(
                detail_of(&bytes).unwrap_or_else(|| NOT_READY_FALLBACK.to_string()),
            )),
            other => Err(ArtifactError::Rejected {
                status: other.as_u16(),
                message: detail_of(&bytes).unwrap_or_else(|| {
                    other.canonical_reason().unwrap_or("Unknown").to_string()
                }),
            }),
        }
    }

    /// Poll `fetch` until the artifact exists, at most `max_polls` times
    pub async fn wait_for(
        &self,
        download: &ResolvedDownload,
        interval: Duration,
        max_polls: u32,
    ) -> Result<Artifact> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.fetch(download).await {
                Ok(artifact) => {
                    if attempts > 1 {
                        debug!(attempts, "Artifact became available");
                    }
                    return Ok(artifact);
                }
                Err(ArtifactError::NotReady(detail)) => {
                    if attempts >= max_polls {
                        warn!(attempts, "Artifact still not ready, giving up");
                        return Err(ArtifactError::GaveUp {
                            attempts,
                            last: detail,
                        });
                    }

                    debug!(attempts, detail = %detail, "Artifact not ready, waiting");
                    tokio::time::sleep(interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn transport_error(&self, err: &reqwest::Error) -> ArtifactError {
        let failure = TransportFailure::from_reqwest(err, &self.origin_label);
        ArtifactError::Transport(classify(&failure))
    }
}

fn header_str(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn detail_of(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .as_ref()
        .and_then(extract_detail)
}

/// `attachment; filename="youtube_audio_20240101_120000.mp3"` -> the file name
pub fn parse_disposition_filename(header: &str) -> Option<String> {
    header.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }

        let name = value.trim().trim_matches('"');
        // Never let the server pick a directory
        let name = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
        (!name.is_empty() && name != "." && name != "..").then(|| name.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_disposition_quoted() {
        assert_eq!(
            parse_disposition_filename(r#"attachment; filename="youtube_audio_20240101_120000.mp3""#)
                .as_deref(),
            Some("youtube_audio_20240101_120000.mp3")
        );
    }

    #[test]
    fn test_parse_disposition_unquoted_and_cased() {
        assert_eq!(
            parse_disposition_filename("attachment; FileName=song.mp3").as_deref(),
            Some("song.mp3")
        );
    }

    #[test]
    fn test_parse_disposition_strips_directories() {
        assert_eq!(
            parse_disposition_filename(r#"attachment; filename="../../etc/passwd""#).as_deref(),
            Some("passwd")
        );
        assert_eq!(parse_disposition_filename(r#"attachment; filename="..""#), None);
        assert_eq!(parse_disposition_filename("attachment"), None);
    }

    #[test]
    fn test_is_audio() {
        let artifact = Artifact {
            bytes: Bytes::from_static(b"ID3"),
            content_type: Some("audio/mpeg".parse().unwrap()),
            file_name: None,
        };
        assert!(artifact.is_audio());

        let artifact = Artifact {
            content_type: Some(mime::APPLICATION_JSON),
            ..artifact
        };
        assert!(!artifact.is_audio());
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/out.mp3");

        let artifact = Artifact {
            bytes: Bytes::from_static(b"ID3fake"),
            content_type: None,
            file_name: None,
        };
        artifact.save(&path).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"ID3fake");
    }
}
