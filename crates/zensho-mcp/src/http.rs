//! HTTP transport
//!
//! Request/response MCP over HTTP: each `POST /mcp` carries one JSON-RPC
//! message and is answered with one JSON-RPC response. Notifications are
//! acknowledged with `202 Accepted` and an empty body.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};

use crate::Result;
use crate::server::ZenshoMcpServer;

/// Build the HTTP router around an initialized server
pub fn router(server: Arc<ZenshoMcpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/health", get(|| async { "ok" }))
        .with_state(server)
}

/// Serve the router until the process is stopped
pub async fn serve(server: ZenshoMcpServer, addr: SocketAddr) -> Result<()> {
    let mut server = server;
    server.initialize();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "MCP server ready, listening on HTTP");

    axum::serve(listener, router(Arc::new(server))).await?;
    Ok(())
}

async fn handle_mcp(State(server): State<Arc<ZenshoMcpServer>>, body: String) -> Response {
    match server.handle_message(&body).await {
        Ok(response) if response.is_empty() => StatusCode::ACCEPTED.into_response(),
        Ok(response) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            response,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to handle HTTP message");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;
    use zensho_core::{Config, Dispatcher};
    use zensho_test_utils::{RecordingUpstream, Reply};

    fn app() -> (Router, Arc<RecordingUpstream>) {
        let upstream = RecordingUpstream::new(Reply::Echo);
        let dispatcher = Dispatcher::new(Config::new("http://upstream.test"), upstream.clone());
        let mut server = ZenshoMcpServer::new(dispatcher);
        server.initialize();
        (router(Arc::new(server)), upstream)
    }

    fn post_mcp(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_tools_call_over_http() {
        let (app, upstream) = app();
        let response = app
            .oneshot(post_mcp(
                r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"search","arguments":{"query":"1.1.1","appNo":"zet"}}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["result"]["isError"], false);
        assert_eq!(upstream.calls()[0].0, "/api/data/search");
    }

    #[tokio::test]
    async fn test_notification_is_accepted() {
        let (app, _) = app();
        let response = app
            .oneshot(post_mcp(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
