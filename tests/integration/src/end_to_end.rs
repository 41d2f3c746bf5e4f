//! End-to-end scenarios: JSON-RPC in, HTTP POST out, envelope back
//!
//! Each test wires the real server, dispatcher and reqwest client against a
//! local HTTP upstream and drives it with raw JSON-RPC messages.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use zensho_core::{Config, Dispatcher, HttpUpstream};
use zensho_mcp::ZenshoMcpServer;
use zensho_test_utils::{MockServer, Reply, refused_base_url};

fn server_for(base_url: &str) -> ZenshoMcpServer {
    let config = Config::new(base_url);
    let upstream = HttpUpstream::new(&config).expect("valid config");
    let mut server = ZenshoMcpServer::new(Dispatcher::new(config, Arc::new(upstream)));
    server.initialize();
    server
}

async fn call(server: &ZenshoMcpServer, tool: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": tool, "arguments": arguments }
    });
    let response = server
        .handle_message(&request.to_string())
        .await
        .expect("server response");
    let response: Value = serde_json::from_str(&response).expect("JSON response");
    assert!(response.get("error").is_none(), "unexpected protocol error: {}", response);
    response["result"].clone()
}

fn text(result: &Value) -> &str {
    result["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn search_normalizes_app_code() {
    let upstream = MockServer::start(Reply::Echo).await;
    let server = server_for(&upstream.base_url());

    let result = call(&server, "search", json!({"query": "1.1.1", "appNo": "zet"})).await;

    assert_eq!(result["isError"], false);
    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/data/search");
    assert_eq!(requests[0].body, json!({"text": "1.1.1", "appNo": "ZET"}));
}

#[tokio::test]
async fn reply_in_teams_without_target_fails_before_post() {
    let upstream = MockServer::start(Reply::Echo).await;
    let server = server_for(&upstream.base_url());

    let result = call(&server, "replyInTeams", json!({"text": "Looking into it"})).await;

    assert_eq!(result["isError"], true);
    assert_eq!(upstream.request_count(), 0);
}

#[tokio::test]
async fn create_backlog_ticket_without_assets() {
    let upstream = MockServer::start(Reply::Echo).await;
    let server = server_for(&upstream.base_url());

    let result = call(
        &server,
        "createBacklogTicket",
        json!({"title": "Login crash", "description": "Steps...", "appNo": "kn"}),
    )
    .await;

    assert_eq!(result["isError"], false);
    let requests = upstream.requests();
    let body = &requests[0].body;
    assert!(body.get("assetsImageIds").is_none());
    assert_eq!(
        body,
        &json!({"title": "Login crash", "description": "Steps...", "appNo": "KN"})
    );
}

#[tokio::test]
async fn echo_round_trip_text_is_pretty_body() {
    let upstream = MockServer::start(Reply::Echo).await;
    let server = server_for(&upstream.base_url());

    let result = call(
        &server,
        "registerLessonLearned",
        json!({
            "context": "Release 1.2",
            "bad": "Skipped QA",
            "why": "Deadline",
            "good": "Run smoke tests",
            "lessionLearn": "Never skip smoke tests"
        }),
    )
    .await;

    let sent = upstream.requests()[0].body.clone();
    assert_eq!(text(&result), serde_json::to_string_pretty(&sent).unwrap());
}

#[tokio::test]
async fn custom_message_overrides_success_text() {
    let upstream = MockServer::start(Reply::Echo).await;
    let server = server_for(&upstream.base_url());

    let result = call(
        &server,
        "registerLessonLearned",
        json!({
            "context": "c", "bad": "b", "why": "w", "good": "g",
            "lessionLearn": "l", "customMessage": "Lesson saved"
        }),
    )
    .await;

    assert_eq!(text(&result), "Lesson saved");
    assert!(upstream.requests()[0].body.get("customMessage").is_none());
}

#[tokio::test]
async fn upstream_500_is_error_envelope() {
    let upstream = MockServer::start(Reply::status(500, "")).await;
    let server = server_for(&upstream.base_url());

    let result = call(&server, "getScreenShot", json!({})).await;

    assert_eq!(result["isError"], true);
    assert!(text(&result).contains("HTTP 500"));
}

#[tokio::test]
async fn connection_failure_is_error_envelope() {
    let server = server_for(&refused_base_url().await);

    let result = call(&server, "readMentions", json!({})).await;

    assert_eq!(result["isError"], true);
    assert!(text(&result).starts_with("Error: "));
}

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let upstream = MockServer::start(Reply::Echo).await;
    let server = Arc::new(server_for(&upstream.base_url()));

    let mut handles = Vec::new();
    for channel in ["dev", "qa", "ops", "release"] {
        let server = Arc::clone(&server);
        handles.push(tokio::spawn(async move {
            call(&server, "readThreads", json!({"channelName": channel})).await
        }));
    }

    for (handle, channel) in handles.into_iter().zip(["dev", "qa", "ops", "release"]) {
        let result = handle.await.unwrap();
        assert_eq!(result["isError"], false);
        let echoed: Value = serde_json::from_str(text(&result)).unwrap();
        assert_eq!(echoed, json!({"channelName": channel}));
    }
    assert_eq!(upstream.request_count(), 4);
}
