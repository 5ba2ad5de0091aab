//! Presentation boundary: one conversion at a time, observable state
//!
//! A UI creates one [`ConversionSession`] at mount, subscribes to its state
//! and calls [`ConversionSession::convert`] from the trigger control. Every
//! failure ends up as a message in the state; only a refused overlapping
//! call is reported as an error.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::{ConversionError, Converter, ErrorKind};
use crate::observability::Metrics;
use crate::state::ConversionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a conversion is already in progress")]
    Busy,
}

pub struct ConversionSession {
    converter: Arc<dyn Converter>,
    state: watch::Sender<ConversionState>,
    metrics: Arc<Metrics>,
}

impl ConversionSession {
    pub fn new(converter: Arc<dyn Converter>) -> Self {
        Self::with_metrics(converter, Arc::new(Metrics::new()))
    }

    pub fn with_metrics(converter: Arc<dyn Converter>, metrics: Arc<Metrics>) -> Self {
        let (state, _) = watch::channel(ConversionState::Idle);
        Self {
            converter,
            state,
            metrics,
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> ConversionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every transition
    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.state.subscribe()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Run one conversion attempt and return the settled state.
    ///
    /// Non-empty input moves the state to `Loading` (clearing the previous
    /// outcome) before the request is issued. Empty input settles in the
    /// error state without a request. Refused with [`SessionError::Busy`]
    /// while another attempt is in flight.
    pub async fn convert(&self, source_url: &str) -> Result<ConversionState, SessionError> {
        if source_url.trim().is_empty() {
            let error = ConversionError::from(ErrorKind::EmptyInput);
            self.transition(|state| state.reject(&error))?;
            self.metrics.attempt_started();
            self.metrics.attempt_failed(error.kind().code());
            debug!("Empty input rejected locally");
            return Ok(self.state());
        }

        self.transition(ConversionState::start)?;
        self.metrics.attempt_started();

        let mut in_flight = InFlight {
            state: &self.state,
            settled: false,
        };

        let result = self.converter.convert(source_url).await;

        match &result {
            Ok(download) => {
                self.metrics.attempt_succeeded();
                info!(download_url = %download.url, "Conversion ready");
            }
            Err(err) => {
                self.metrics.attempt_failed(err.kind().code());
                info!(code = err.kind().code(), message = %err, "Conversion failed");
            }
        }

        self.state.send_modify(|state| {
            if let Err(e) = state.settle(&result) {
                warn!(error = %e, "Conversion settled outside of loading state");
            }
        });
        in_flight.settled = true;

        Ok(self.state())
    }

    fn transition<F, E>(&self, apply: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut ConversionState) -> Result<(), E>,
    {
        let mut outcome = Ok(());
        self.state.send_if_modified(|state| {
            let applied = apply(state).is_ok();
            if !applied {
                outcome = Err(SessionError::Busy);
            }
            applied
        });

        if outcome.is_err() {
            self.metrics.busy_rejected();
            warn!("Conversion refused: another attempt is in flight");
        }
        outcome
    }
}

/// Puts the state back to `Idle` if the `convert` future is dropped mid-flight
struct InFlight<'a> {
    state: &'a watch::Sender<ConversionState>,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.state.send_if_modified(|state| {
                if state.is_loading() {
                    *state = ConversionState::Idle;
                    true
                } else {
                    false
                }
            });
        }
    }
}
