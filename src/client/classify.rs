//! Transport failure classification
//!
//! Structured signals (timeout flag, connect flag) are checked before any
//! message inspection. The message heuristics only see the innermost cause,
//! never the outer layers that quote the request URL, and the timeout
//! heuristic runs before the unreachable one.

use super::error::ErrorKind;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::trace;

/// Low-level failure signals gathered from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub timed_out: bool,
    pub connect: bool,
    /// Full error chain, outermost first, joined with ": "
    pub message: String,
    /// Innermost cause only; the text the message heuristics inspect
    pub cause: String,
    /// Origin named in the unreachable hint
    pub origin: String,
}

impl TransportFailure {
    pub fn from_reqwest(err: &reqwest::Error, origin: &str) -> Self {
        Self {
            timed_out: err.is_timeout(),
            connect: err.is_connect(),
            message: error_chain(err),
            cause: root_cause(err),
            origin: origin.to_string(),
        }
    }

    /// The client-side deadline elapsed before the exchange finished
    pub fn elapsed(timeout: Duration, origin: &str) -> Self {
        let message = format!("request timed out after {:?}", timeout);
        Self {
            timed_out: true,
            connect: false,
            cause: message.clone(),
            message,
            origin: origin.to_string(),
        }
    }
}

type Rule = fn(&TransportFailure) -> Option<ErrorKind>;

/// First match wins
const PRECEDENCE: &[(&str, Rule)] = &[
    ("timeout_signal", timeout_signal),
    ("connect_signal", connect_signal),
    ("timeout_message", timeout_message),
    ("unreachable_message", unreachable_message),
];

const TIMEOUT_MARKERS: &[&str] = &["timed out", "deadline has elapsed"];

// Wording differs per platform and resolver; best effort only.
const UNREACHABLE_MARKERS: &[&str] = &[
    "connection refused",
    "actively refused",
    "connection reset",
    "network is unreachable",
    "no route to host",
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "failed to fetch",
    "error sending request",
];

/// Map a transport failure onto the error taxonomy
pub fn classify(failure: &TransportFailure) -> ErrorKind {
    for (name, rule) in PRECEDENCE {
        if let Some(kind) = rule(failure) {
            trace!(rule = *name, code = kind.code(), "Transport failure classified");
            return kind;
        }
    }

    ErrorKind::Unknown(failure.message.clone())
}

fn timeout_signal(failure: &TransportFailure) -> Option<ErrorKind> {
    failure.timed_out.then_some(ErrorKind::Timeout)
}

fn timeout_message(failure: &TransportFailure) -> Option<ErrorKind> {
    contains_any(&failure.cause, TIMEOUT_MARKERS).then_some(ErrorKind::Timeout)
}

fn connect_signal(failure: &TransportFailure) -> Option<ErrorKind> {
    failure
        .connect
        .then(|| ErrorKind::unreachable(&failure.origin))
}

fn unreachable_message(failure: &TransportFailure) -> Option<ErrorKind> {
    contains_any(&failure.cause, UNREACHABLE_MARKERS)
        .then(|| ErrorKind::unreachable(&failure.origin))
}

fn contains_any(message: &str, markers: &[&str]) -> bool {
    let lowered = message.to_lowercase();
    markers.iter().any(|marker| lowered.contains(marker))
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(cause) = current {
        parts.push(cause.to_string());
        current = cause.source();
    }
    parts.join(": ")
}

fn root_cause(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(cause) = current.source() {
        current = cause;
    }
    current.to_string()
}
