use reqwest::StatusCode;
use thiserror::Error;

/// Failure taxonomy for one conversion attempt.
///
/// `Display` is the user-facing message stored in the conversion state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Please enter a YouTube URL")]
    EmptyInput,

    #[error("Request timed out. The server took too long to respond.")]
    Timeout,

    #[error("Network error: {hint}")]
    NetworkUnreachable { hint: String },

    #[error("{0}")]
    BackendRejected(String),

    #[error("Invalid response from server")]
    MalformedResponse,

    #[error("{0}")]
    Unknown(String),
}

impl ErrorKind {
    pub fn unreachable(origin: &str) -> Self {
        ErrorKind::NetworkUnreachable {
            hint: format!("ensure backend is reachable at {}", origin),
        }
    }

    /// Stable label for logs and metrics
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "EMPTY_INPUT",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::NetworkUnreachable { .. } => "NETWORK_UNREACHABLE",
            ErrorKind::BackendRejected(_) => "BACKEND_REJECTED",
            ErrorKind::MalformedResponse => "MALFORMED_RESPONSE",
            ErrorKind::Unknown(_) => "UNKNOWN",
        }
    }
}

/// Error returned by `convert()`
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct ConversionError {
    kind: ErrorKind,
    status: Option<StatusCode>,
    #[source]
    source: Option<reqwest::Error>,
}

impl ConversionError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            status: None,
            source: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: reqwest::Error) -> Self {
        self.source = Some(source);
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// HTTP status of the response, when one was received
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn user_message(&self) -> String {
        self.kind.to_string()
    }
}

impl From<ErrorKind> for ConversionError {
    fn from(kind: ErrorKind) -> Self {
        ConversionError::new(kind)
    }
}

/// Errors building a client
#[derive(Debug, Error)]
pub enum ClientInitError {
    #[error("unsupported backend origin '{0}', expected http or https")]
    UnsupportedOrigin(String),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
