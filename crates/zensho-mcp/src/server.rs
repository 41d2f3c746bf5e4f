//! MCP Server implementation
//!
//! The main server struct that coordinates MCP protocol handling with the
//! tool dispatcher.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use zensho_core::Dispatcher;

use crate::protocol::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION, ServerCapabilities,
    ServerInfo, ToolCallParams, ToolsCapability, codes,
};
use crate::tools::{ToolDefinition, get_tool_definitions};
use crate::{Error, Result};

/// MCP Server for the Zensho automation API
///
/// Every `tools/call` is handed to the [`Dispatcher`], which performs a single
/// upstream POST and always yields a tool result envelope.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use zensho_core::{Config, Dispatcher, HttpUpstream};
/// use zensho_mcp::ZenshoMcpServer;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::new("https://automation.example.com");
///     let upstream = HttpUpstream::new(&config)?;
///     let server = ZenshoMcpServer::new(Dispatcher::new(config, Arc::new(upstream)));
///     server.run().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ZenshoMcpServer {
    dispatcher: Dispatcher,

    /// Whether the server has been initialized
    initialized: bool,

    /// Available MCP tools
    tools: Vec<ToolDefinition>,
}

impl ZenshoMcpServer {
    /// Create a new MCP server instance
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            initialized: false,
            tools: Vec::new(),
        }
    }

    /// Initialize the server
    ///
    /// Loads the tool definitions served by `tools/list`.
    pub fn initialize(&mut self) {
        tracing::info!(
            base_url = %self.dispatcher.config().upstream.base_url,
            "Initializing MCP server"
        );
        self.tools = get_tool_definitions();
        self.initialized = true;
    }

    /// Run the MCP server over stdin/stdout
    ///
    /// One JSON-RPC message per line. Each message is handled on its own task,
    /// so a slow upstream call does not hold back later requests; responses go
    /// out through a single writer in completion order. Returns once stdin
    /// closes and every in-flight request has been answered.
    pub async fn run(mut self) -> Result<()> {
        self.initialize();
        tracing::info!(tools = self.tools.len(), "MCP server ready, listening on stdio");

        let server = Arc::new(self);
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(response) = rx.recv().await {
                stdout.write_all(response.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!(request = %line, "Received message");

            let server = Arc::clone(&server);
            let tx = tx.clone();
            tokio::spawn(async move {
                let response = server.respond(&line).await;
                // Notifications produce no output
                if !response.is_empty() && tx.send(response).is_err() {
                    tracing::warn!("stdout writer stopped, dropping response");
                }
            });
        }

        tracing::info!("stdin closed, shutting down");
        drop(tx);
        writer
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))??;
        Ok(())
    }

    /// Handle one message, turning an internal failure into a JSON-RPC error
    async fn respond(&self, message: &str) -> String {
        match self.handle_message(message).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Failed to handle message");
                let response = JsonRpcResponse::error(
                    None,
                    codes::INTERNAL_ERROR,
                    format!("Internal error: {}", e),
                );
                serde_json::to_string(&response).unwrap_or_default()
            }
        }
    }

    /// Handle a single MCP message
    ///
    /// Parses the JSON-RPC request and dispatches to the appropriate handler.
    /// Returns the JSON-RPC response as a string, or an empty string for
    /// notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable message");
                let response =
                    JsonRpcResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {}", e));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        if request.jsonrpc != "2.0" {
            let response = JsonRpcResponse::error(
                request.id,
                codes::INVALID_REQUEST,
                format!("Invalid Request: unsupported jsonrpc version {}", request.jsonrpc),
            );
            return serde_json::to_string(&response).map_err(Error::from);
        }

        // Anything without an id is a notification and gets no reply
        if request.id.is_none() {
            tracing::debug!(method = %request.method, "Notification");
            return Ok(String::new());
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id)?,
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await?,
            _ => JsonRpcResponse::error(
                request.id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        serde_json::to_string(&response).map_err(Error::from)
    }

    /// Handle the initialize request
    fn handle_initialize(&self, id: Option<Value>) -> Result<JsonRpcResponse> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: "zensho".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = if self.initialized {
            self.tools.clone()
        } else {
            get_tool_definitions()
        };
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    /// Handle tools/call request
    ///
    /// Tool failures are reported inside the result envelope, never as
    /// JSON-RPC errors. Only malformed params are a protocol error.
    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> Result<JsonRpcResponse> {
        let tool_params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return Ok(JsonRpcResponse::error(
                    id,
                    codes::INVALID_PARAMS,
                    format!("Invalid params: {}", e),
                ));
            }
        };

        let result = self
            .dispatcher
            .invoke(&tool_params.name, tool_params.arguments)
            .await;
        if result.is_error {
            tracing::info!(tool = %tool_params.name, "Tool call failed");
        }

        Ok(JsonRpcResponse::success(id, serde_json::to_value(result)?))
    }

    /// Check if the server is initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Get available tools
    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use zensho_core::Config;
    use zensho_test_utils::{RecordingUpstream, Reply};

    fn server() -> ZenshoMcpServer {
        let upstream = RecordingUpstream::new(Reply::Unreachable("no upstream in unit tests".into()));
        let dispatcher = Dispatcher::new(Config::new("http://upstream.test"), upstream);
        ZenshoMcpServer::new(dispatcher)
    }

    #[test]
    fn server_creation() {
        let server = server();
        assert!(!server.is_initialized());
        assert!(server.tools().is_empty());
    }

    #[test]
    fn server_loads_tools_on_initialize() {
        let mut server = server();
        server.initialize();
        assert!(server.is_initialized());
        assert_eq!(server.tools().len(), 19);

        let tool_names: Vec<&str> = server.tools().iter().map(|t| t.name.as_str()).collect();
        assert!(tool_names.contains(&"browse"));
        assert!(tool_names.contains(&"replyInTeams"));
        assert!(tool_names.contains(&"getScreenShot"));
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let mut server = server();
        server.initialize();

        let request = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1.0"}}}"#;

        let response: Value =
            serde_json::from_str(&server.handle_message(request).await.unwrap()).unwrap();
        assert_eq!(response["result"]["serverInfo"]["name"], "zensho");
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[rstest]
    #[case::legacy_initialized(r#"{"jsonrpc":"2.0","method":"initialized"}"#)]
    #[case::initialized(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)]
    #[case::cancelled(
        r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":1}}"#
    )]
    #[case::unknown_method(r#"{"jsonrpc":"2.0","method":"notifications/whatever"}"#)]
    #[case::tools_call_without_id(
        r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"readMentions"}}"#
    )]
    #[tokio::test]
    async fn test_notifications_get_no_reply(#[case] request: &str) {
        let server = server();
        let response = server.handle_message(request).await.unwrap();
        assert!(response.is_empty(), "{}", request);
    }

    #[tokio::test]
    async fn test_handle_ping() {
        let server = server();
        let response: Value = serde_json::from_str(
            &server
                .handle_message(r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#)
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(response["id"], "p");
        assert_eq!(response["result"], json!({}));
    }

    #[tokio::test]
    async fn test_handle_tools_list() {
        let mut server = server();
        server.initialize();

        let request = r#"{"jsonrpc":"2.0","id":2,"method":"tools/list","params":{}}"#;

        let response = server.handle_message(request).await.unwrap();
        assert!(response.contains("listBacklogHandlingTickets"));
        assert!(response.contains("registerLessonLearned"));
        assert!(response.contains("inputSchema"));
    }

    #[tokio::test]
    async fn test_handle_unknown_method() {
        let server = server();
        let request = r#"{"jsonrpc":"2.0","id":4,"method":"resources/list","params":{}}"#;

        let response: Value =
            serde_json::from_str(&server.handle_message(request).await.unwrap()).unwrap();
        assert_eq!(response["error"]["code"], codes::METHOD_NOT_FOUND);
        assert!(
            response["error"]["message"]
                .as_str()
                .unwrap()
                .contains("resources/list")
        );
    }

    #[tokio::test]
    async fn test_handle_tools_call_unknown_tool() {
        let server = server();
        let request = r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"unknown_tool","arguments":{}}}"#;

        let response: Value =
            serde_json::from_str(&server.handle_message(request).await.unwrap()).unwrap();
        // Tool errors are returned as successful responses with isError: true
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(
            response["result"]["content"][0]["text"],
            "Error: unknown tool: unknown_tool"
        );
    }

    #[tokio::test]
    async fn test_handle_tools_call_transport_failure() {
        let server = server();
        let request = r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"readMentions"}}"#;

        let response: Value =
            serde_json::from_str(&server.handle_message(request).await.unwrap()).unwrap();
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(
            response["result"]["content"][0]["text"],
            "Error: no upstream in unit tests"
        );
    }

    #[tokio::test]
    async fn test_handle_tools_call_bad_params() {
        let server = server();
        let request = r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"arguments":{}}}"#;

        let response: Value =
            serde_json::from_str(&server.handle_message(request).await.unwrap()).unwrap();
        assert_eq!(response["error"]["code"], codes::INVALID_PARAMS);
        assert_eq!(response["id"], 7);
    }

    #[tokio::test]
    async fn test_handle_invalid_json() {
        let server = server();
        let response: Value =
            serde_json::from_str(&server.handle_message(r#"{"invalid json"#).await.unwrap())
                .unwrap();
        assert_eq!(response["error"]["code"], codes::PARSE_ERROR);
        assert!(response.get("id").is_none());
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let server = server();
        let response: Value = serde_json::from_str(
            &server
                .handle_message(r#"{"jsonrpc":"1.0","id":8,"method":"ping"}"#)
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(response["error"]["code"], codes::INVALID_REQUEST);
    }
}
