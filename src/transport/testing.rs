//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::transport::{BackendTransport, DispatchError};

/// Replays queued chat outcomes, then repeats a fallback outcome.
#[derive(Debug)]
pub(crate) struct ScriptedTransport {
    endpoint: String,
    script: Mutex<VecDeque<Result<Value, DispatchError>>>,
    fallback: Result<Value, DispatchError>,
    probe_ok: AtomicBool,
    chat_calls: AtomicUsize,
    probe_calls: AtomicUsize,
    last_body: Mutex<Option<Value>>,
}

impl ScriptedTransport {
    pub(crate) fn new(endpoint: &str, fallback: Result<Value, DispatchError>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            script: Mutex::new(VecDeque::new()),
            fallback,
            probe_ok: AtomicBool::new(true),
            chat_calls: AtomicUsize::new(0),
            probe_calls: AtomicUsize::new(0),
            last_body: Mutex::new(None),
        }
    }

    pub(crate) fn ok(endpoint: &str, response: Value) -> Self {
        Self::new(endpoint, Ok(response))
    }

    pub(crate) fn failing(endpoint: &str, error: DispatchError) -> Self {
        Self::new(endpoint, Err(error))
    }

    pub(crate) fn then(self, outcome: Result<Value, DispatchError>) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    pub(crate) fn with_probe(self, ok: bool) -> Self {
        self.probe_ok.store(ok, Ordering::SeqCst);
        self
    }

    pub(crate) fn set_probe(&self, ok: bool) {
        self.probe_ok.store(ok, Ordering::SeqCst);
    }

    pub(crate) fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }
}

/// A transient error as produced by a refused connection.
pub(crate) fn refused(endpoint: &str) -> DispatchError {
    DispatchError::Connection {
        endpoint: endpoint.to_string(),
        reason: "connection refused".to_string(),
    }
}

#[async_trait]
impl BackendTransport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn chat_completion(&self, body: &Value) -> Result<Value, DispatchError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().unwrap() = Some(body.clone());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }

    async fn probe(&self) -> Result<(), DispatchError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.probe_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(refused(&self.endpoint))
        }
    }
}
