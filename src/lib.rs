//! Failover client for OpenAI-compatible inference backends.
//!
//! ```text
//!   caller
//!     │ chat_completion(model, messages, options)
//!     ▼
//! ┌───────────┐   ┌──────────────────┐   ┌────────────────┐   ┌─────────────┐
//! │ inference │──▶│    resilience    │──▶│ load_balancer  │──▶│   health    │
//! │  client   │   │ retries/backoff  │   │ registry +     │   │ throttled   │
//! └───────────┘   │ deadline         │   │ selector       │   │ probes      │
//!                 └────────┬─────────┘   └────────────────┘   └─────────────┘
//!                          │ operation(backend)
//!                          ▼
//!                 ┌──────────────────┐
//!                 │    transport     │──▶ POST {base}/v1/chat/completions
//!                 └──────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod health;
pub mod inference;
pub mod load_balancer;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use config::FailoverConfig;
pub use error::InferenceError;
pub use inference::{ChatMessage, ChatOptions, InferenceClient, Role};
pub use resilience::timeouts::Deadline;
pub use transport::{BackendTransport, DispatchError};
