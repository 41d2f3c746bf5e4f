//! Local HTTP upstream for end-to-end tests.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

/// How an upstream double answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with the received body
    Echo,
    /// Fixed status and raw body
    Status { status: u16, body: String },
    /// Transport failure before any response (in-process double only)
    Unreachable(String),
}

impl Reply {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Reply::Status {
            status,
            body: body.into(),
        }
    }
}

/// One request as seen by [`MockServer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    /// Header names are lowercase
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body, `Value::Null` if it did not parse
    pub body: Value,
}

struct MockState {
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Real HTTP server on `127.0.0.1` with an ephemeral port.
///
/// # Example
///
/// ```rust,no_run
/// use zensho_test_utils::{MockServer, Reply};
///
/// # async fn example() {
/// let server = MockServer::start(Reply::Echo).await;
/// let base_url = server.base_url();
/// # }
/// ```
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockServer {
    /// Bind and serve in a background task of the current runtime.
    pub async fn start(reply: Reply) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("MockServer: failed to bind");
        let addr = listener.local_addr().expect("MockServer: no local addr");

        let state = Arc::new(MockState {
            reply,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .expect("requests lock poisoned")
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: axum::http::Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect(),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    state
        .requests
        .lock()
        .expect("requests lock poisoned")
        .push(recorded);

    match &state.reply {
        Reply::Echo => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Reply::Status { status, body } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body.clone()).into_response()
        }
        Reply::Unreachable(_) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

/// Base URL of a local port nothing listens on.
pub async fn refused_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("refused_base_url: failed to bind");
    let addr = listener.local_addr().expect("refused_base_url: no local addr");
    drop(listener);
    format!("http://{}", addr)
}
