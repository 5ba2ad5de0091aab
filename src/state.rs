//! Conversion state consumed by the presentation layer
//!
//! ```text
//! Idle ──start──▶ Loading ──settle(Ok)──▶ Ready
//!   │                ▲   └──settle(Err)─▶ Failed
//!   └──reject──▶ Failed  │
//!        Ready / Failed ─┘ start
//! ```
//!
//! `Ready` and `Failed` carry their own payload, so a download URL and an
//! error message can never be present at the same time.

use thiserror::Error;
use url::Url;

use crate::client::{ConversionError, ResolvedDownload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("a conversion is already in progress")]
    AlreadyLoading,
    #[error("no conversion is in progress")]
    NotLoading,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversionState {
    #[default]
    Idle,
    Loading,
    Ready { download: ResolvedDownload },
    Failed { message: String },
}

impl ConversionState {
    pub fn phase(&self) -> Phase {
        match self {
            ConversionState::Idle => Phase::Idle,
            ConversionState::Loading => Phase::Loading,
            ConversionState::Ready { .. } => Phase::Ready,
            ConversionState::Failed { .. } => Phase::Error,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ConversionState::Loading)
    }

    pub fn download(&self) -> Option<&ResolvedDownload> {
        match self {
            ConversionState::Ready { download } => Some(download),
            _ => None,
        }
    }

    pub fn download_url(&self) -> Option<&Url> {
        self.download().map(|download| &download.url)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ConversionState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Enter `Loading`, dropping any previous URL or message
    pub fn start(&mut self) -> Result<(), TransitionError> {
        if self.is_loading() {
            return Err(TransitionError::AlreadyLoading);
        }
        *self = ConversionState::Loading;
        Ok(())
    }

    /// Record the outcome of the in-flight attempt
    pub fn settle(
        &mut self,
        result: &Result<ResolvedDownload, ConversionError>,
    ) -> Result<(), TransitionError> {
        if !self.is_loading() {
            return Err(TransitionError::NotLoading);
        }

        *self = match result {
            Ok(download) => ConversionState::Ready {
                download: download.clone(),
            },
            Err(err) => ConversionState::Failed {
                message: err.user_message(),
            },
        };
        Ok(())
    }

    /// Fail without a request, e.g. on empty input
    pub fn reject(&mut self, error: &ConversionError) -> Result<(), TransitionError> {
        if self.is_loading() {
            return Err(TransitionError::AlreadyLoading);
        }
        *self = ConversionState::Failed {
            message: error.user_message(),
        };
        Ok(())
    }
}
