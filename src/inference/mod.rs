//! Inference facade.
//!
//! # Data Flow
//! ```text
//! chat_completion(model, messages, options)
//!     → types.rs (build JSON body, reject unusable requests)
//!     → RetryCoordinator::execute(dispatch closure)
//!     → provider JSON returned as-is
//! ```

pub mod client;
pub mod types;

pub use client::InferenceClient;
pub use types::{ChatMessage, ChatOptions, Role};
