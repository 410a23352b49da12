//! Backend transport subsystem.
//!
//! # Data Flow
//! ```text
//! RetryCoordinator picks a Backend
//!     → backend.transport() (bound once at registry construction)
//!     → http.rs: POST {base}/v1/chat/completions
//!     → Ok(provider JSON) or DispatchError
//!     → DispatchError::class() decides retry vs. short-circuit
//! ```
//!
//! # Design Decisions
//! - One transport instance per backend; no per-call endpoint patching
//! - Every call carries its own timeout
//! - Connection errors, timeouts, 408, 429 and 5xx are transient
//! - Other 4xx are terminal (another backend cannot fix a bad request)

pub mod http;
#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpTransport;

/// Whether a failed dispatch is worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Retry, possibly on another backend.
    Transient,
    /// Propagate immediately without consuming retry budget.
    Terminal,
}

/// Failure of a single call to a single backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// TCP/HTTP connection to the backend failed.
    #[error("connection failed to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    /// The backend did not answer within the allotted time.
    #[error("request to {endpoint} timed out after {}ms", after.as_millis())]
    Timeout { endpoint: String, after: Duration },

    /// Non-2xx HTTP response.
    #[error("HTTP {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("invalid response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// The request itself is unusable.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl DispatchError {
    /// Classify this error for the retry loop.
    pub fn class(&self) -> ErrorClass {
        match self {
            DispatchError::Connection { .. }
            | DispatchError::Timeout { .. }
            | DispatchError::Decode { .. } => ErrorClass::Transient,
            DispatchError::Status { status, .. } => classify_status(*status),
            DispatchError::InvalidRequest { .. } => ErrorClass::Terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.class() == ErrorClass::Terminal
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Connection { .. } => "connection",
            DispatchError::Timeout { .. } => "timeout",
            DispatchError::Status { .. } => "status",
            DispatchError::Decode { .. } => "decode",
            DispatchError::InvalidRequest { .. } => "invalid_request",
        }
    }
}

/// Classify an HTTP status code returned by a backend.
pub fn classify_status(status: u16) -> ErrorClass {
    match status {
        408 | 429 => ErrorClass::Transient,
        400..=499 => ErrorClass::Terminal,
        _ => ErrorClass::Transient,
    }
}

/// Issues requests to exactly one backend endpoint.
#[async_trait]
pub trait BackendTransport: Send + Sync + fmt::Debug {
    /// Base URL this transport is bound to.
    fn endpoint(&self) -> &str;

    /// Send a chat completion body and return the provider response untouched.
    async fn chat_completion(&self, body: &Value) -> Result<Value, DispatchError>;

    /// Lightweight liveness call.
    async fn probe(&self) -> Result<(), DispatchError>;
}
