//! HTTP transport for OpenAI-compatible backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::transport::{BackendTransport, DispatchError};

/// Path of the chat completion endpoint, relative to the backend base URL.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

const USER_AGENT: &str = concat!("inference-failover/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in a `DispatchError::Status`.
const MAX_ERROR_BODY: usize = 512;

/// Timeouts and probe settings shared by every HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransportSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub probe_path: String,
}

impl Default for HttpTransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(120),
            probe_timeout: Duration::from_secs(5),
            probe_path: "/".to_string(),
        }
    }
}

/// `reqwest`-backed transport bound to one backend.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    chat_url: String,
    probe_url: String,
    request_timeout: Duration,
    probe_timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `base_url`.
    pub fn new(base_url: &Url, settings: &HttpTransportSettings) -> Result<Self, DispatchError> {
        let endpoint = base_url.as_str().trim_end_matches('/').to_string();
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DispatchError::Connection {
                endpoint: endpoint.clone(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self::with_client(client, base_url, settings))
    }

    /// Create a transport sharing an existing client's connection pool.
    pub fn with_client(client: Client, base_url: &Url, settings: &HttpTransportSettings) -> Self {
        let endpoint = base_url.as_str().trim_end_matches('/').to_string();
        let probe_path = if settings.probe_path.starts_with('/') {
            settings.probe_path.clone()
        } else {
            format!("/{}", settings.probe_path)
        };

        Self {
            client,
            chat_url: format!("{}{}", endpoint, CHAT_COMPLETIONS_PATH),
            probe_url: format!("{}{}", endpoint, probe_path),
            endpoint,
            request_timeout: settings.request_timeout,
            probe_timeout: settings.probe_timeout,
        }
    }

    fn map_send_error(&self, err: reqwest::Error, timeout: Duration) -> DispatchError {
        if err.is_timeout() {
            DispatchError::Timeout {
                endpoint: self.endpoint.clone(),
                after: timeout,
            }
        } else {
            DispatchError::Connection {
                endpoint: self.endpoint.clone(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl BackendTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn chat_completion(&self, body: &Value) -> Result<Value, DispatchError> {
        let response = self
            .client
            .post(&self.chat_url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.request_timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e, self.request_timeout))?;

        if !status.is_success() {
            return Err(DispatchError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str(&text).map_err(|e| DispatchError::Decode {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })
    }

    async fn probe(&self) -> Result<(), DispatchError> {
        let response = self
            .client
            .get(&self.probe_url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, self.probe_timeout))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DispatchError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_built_from_base() {
        let base = Url::parse("http://gpu-box:11434/").unwrap();
        let settings = HttpTransportSettings {
            probe_path: "api/tags".into(),
            ..Default::default()
        };
        let transport = HttpTransport::with_client(Client::new(), &base, &settings);

        assert_eq!(transport.endpoint(), "http://gpu-box:11434");
        assert_eq!(transport.chat_url, "http://gpu-box:11434/v1/chat/completions");
        assert_eq!(transport.probe_url, "http://gpu-box:11434/api/tags");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo", 2), "h...");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
