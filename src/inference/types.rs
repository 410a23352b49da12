//! Request shapes for the chat completion endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One entry of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Extra provider options merged into the request body (temperature, etc.).
pub type ChatOptions = Map<String, Value>;

/// Build the JSON body for a chat completion.
///
/// `model` and `messages` always win over same-named options. Streaming is
/// not supported, so `stream: true` is rejected.
pub fn build_request_body(
    model: &str,
    messages: &[ChatMessage],
    options: &ChatOptions,
) -> Result<Value, String> {
    if model.trim().is_empty() {
        return Err("model must not be empty".to_string());
    }
    if messages.is_empty() {
        return Err("at least one message is required".to_string());
    }
    if options.get("stream").and_then(Value::as_bool) == Some(true) {
        return Err("streaming responses are not supported".to_string());
    }

    let mut body = options.clone();
    body.insert("model".to_string(), Value::String(model.to_string()));
    body.insert(
        "messages".to_string(),
        serde_json::to_value(messages).map_err(|e| e.to_string())?,
    );
    Ok(Value::Object(body))
}
