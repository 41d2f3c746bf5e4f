//! In-process upstream double.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use zensho_core::{Upstream, UpstreamError, UpstreamResponse};

use crate::server::Reply;

/// Records every call and answers according to a [`Reply`].
///
/// # Example
///
/// ```rust,no_run
/// use zensho_test_utils::{RecordingUpstream, Reply};
///
/// let upstream = RecordingUpstream::new(Reply::Echo);
/// assert_eq!(upstream.call_count(), 0);
/// ```
#[derive(Debug)]
pub struct RecordingUpstream {
    reply: Reply,
    calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingUpstream {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Number of POSTs attempted so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock poisoned").len()
    }

    /// Every `(endpoint, body)` pair received, in call order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    /// Body of the most recent call.
    pub fn last_body(&self) -> Option<Value> {
        self.calls().last().map(|(_, body)| body.clone())
    }
}

#[async_trait]
impl Upstream for RecordingUpstream {
    async fn post(&self, endpoint: &str, body: &Value) -> Result<UpstreamResponse, UpstreamError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((endpoint.to_string(), body.clone()));

        match &self.reply {
            Reply::Echo => Ok(UpstreamResponse::new(200, body.to_string())),
            Reply::Status { status, body } => Ok(UpstreamResponse::new(*status, body.clone())),
            Reply::Unreachable(message) => Err(UpstreamError::new(message.clone())),
        }
    }
}
