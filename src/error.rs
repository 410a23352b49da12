//! Errors surfaced to callers of the inference client.

use thiserror::Error;

use crate::transport::DispatchError;

/// Failure of one logical inference call.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    /// The backend rejected the request in a way no other backend can fix.
    #[error("request rejected by {backend}: {source}")]
    Terminal {
        backend: String,
        #[source]
        source: DispatchError,
    },

    /// The retry budget ran out on every backend.
    #[error(
        "all backends failed after {attempts} attempts (tried: {}): {}",
        hosts_tried.join(", "),
        describe(last_error)
    )]
    Exhausted {
        hosts_tried: Vec<String>,
        attempts: u32,
        last_error: Option<DispatchError>,
    },

    /// The caller's deadline passed before any backend succeeded.
    #[error(
        "deadline exceeded after {attempts} attempts (tried: {}): {}",
        hosts_tried.join(", "),
        describe(last_error)
    )]
    DeadlineExceeded {
        hosts_tried: Vec<String>,
        attempts: u32,
        last_error: Option<DispatchError>,
    },

    /// The request could not be built; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The client has no backends to try.
    #[error("no backends registered")]
    NoBackends,
}

impl InferenceError {
    /// Backend names attempted before giving up, in first-tried order.
    pub fn hosts_tried(&self) -> &[String] {
        match self {
            InferenceError::Exhausted { hosts_tried, .. }
            | InferenceError::DeadlineExceeded { hosts_tried, .. } => hosts_tried,
            _ => &[],
        }
    }

    /// Most recent backend error behind this failure.
    pub fn last_error(&self) -> Option<&DispatchError> {
        match self {
            InferenceError::Terminal { source, .. } => Some(source),
            InferenceError::Exhausted { last_error, .. }
            | InferenceError::DeadlineExceeded { last_error, .. } => last_error.as_ref(),
            _ => None,
        }
    }
}

fn describe(error: &Option<DispatchError>) -> String {
    match error {
        Some(e) => e.to_string(),
        None => "no attempt completed".to_string(),
    }
}
