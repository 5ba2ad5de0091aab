//! Wire models for the conversion backend.
//!
//! The backend exposes a single job-submission endpoint:
//!
//! ```json
//! POST /convert
//! { "youtube_url": "https://youtu.be/abc", "quality": "high" }
//!
//! 200 OK
//! {
//!   "download_url": "/download/5f0c...",
//!   "status": "processing",
//!   "message": "Your file is being processed...",
//!   "estimated_wait_time": "15-30 seconds"
//! }
//! ```
//!
//! Failures carry a `detail` field, either a plain string or, for request
//! validation failures, a list of `{ "loc": [...], "msg": "...", "type": "..." }`
//! objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Generic message used when the backend gives no reason
pub const GENERIC_FAILURE: &str = "Conversion failed";

/// Audio quality requested from the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    High,
    Medium,
    Low,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Quality::High),
            "medium" => Ok(Quality::Medium),
            "low" => Ok(Quality::Low),
            other => Err(format!(
                "unknown quality '{}', expected high, medium or low",
                other
            )),
        }
    }
}

/// Body of `POST /convert`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    #[serde(rename = "youtube_url")]
    pub source_url: String,
    pub quality: Quality,
}

impl ConversionRequest {
    /// Build a request from raw user input; `None` when the trimmed input is empty
    pub fn new(source_url: &str, quality: Quality) -> Option<Self> {
        let trimmed = source_url.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(Self {
            source_url: trimmed.to_string(),
            quality,
        })
    }
}

/// Successful `/convert` body, before resolution against the origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Backend-relative reference to the artifact
    pub download_path: String,
    pub status: Option<String>,
    pub message: Option<String>,
    pub estimated_wait_time: Option<String>,
}

impl ConversionResult {
    /// Extract the result from a parsed 200 body.
    ///
    /// Returns `None` when `download_url` is missing, not a string, or blank.
    /// The informational fields are dropped when they are not strings.
    pub fn from_body(body: &Value) -> Option<Self> {
        let download_path = body
            .get("download_url")
            .and_then(Value::as_str)
            .filter(|path| !path.trim().is_empty())?;

        Some(Self {
            download_path: download_path.to_string(),
            status: string_field(body, "status"),
            message: string_field(body, "message"),
            estimated_wait_time: string_field(body, "estimated_wait_time"),
        })
    }
}

/// Absolute, same-origin link to the produced artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDownload {
    pub url: Url,
    pub status: Option<String>,
    pub message: Option<String>,
    pub estimated_wait_time: Option<String>,
}

impl ResolvedDownload {
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Pull a user-facing reason out of an error body.
///
/// A string `detail` is used as-is. A list `detail` has the `msg` of each
/// entry joined with `"; "`. Anything else yields `None`.
pub fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();

            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
