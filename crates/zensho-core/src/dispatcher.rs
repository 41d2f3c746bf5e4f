//! Tool call dispatcher
//!
//! Turns one MCP tool invocation into at most one upstream POST:
//!
//! ```text
//! lookup → validate + normalize → typed request → POST → envelope
//! ```
//!
//! Validation failures stop before the network. Every failure, wherever it
//! happens, goes through [`error_result`] so the envelope shape lives in one
//! place.

use std::sync::Arc;

use serde_json::Value;

use crate::args::{self, ValidatedArgs};
use crate::config::Config;
use crate::error::ToolError;
use crate::registry::{self, ToolSpec};
use crate::request::ToolRequest;
use crate::result::ToolResult;
use crate::upstream::{Upstream, UpstreamResponse};

/// Stateless per call; cheap to share behind an `Arc`
#[derive(Clone)]
pub struct Dispatcher {
    config: Config,
    upstream: Arc<dyn Upstream>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(config: Config, upstream: Arc<dyn Upstream>) -> Self {
        Self { config, upstream }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a tool and always produce an envelope
    pub async fn invoke(&self, name: &str, arguments: Value) -> ToolResult {
        match self.try_invoke(name, arguments).await {
            Ok(Success::Json(data)) => {
                // Values built by serde_json always pretty-print
                let text = serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string());
                ToolResult::text(text)
            }
            Ok(Success::Message(text)) => ToolResult::text(text),
            Err(err) => {
                if err.is_local() {
                    tracing::info!(tool = name, error = %err, "Rejected before upstream call");
                }
                error_result(&err, self.config.tools.include_error_body)
            }
        }
    }

    /// Run a tool and return the typed outcome
    pub async fn try_invoke(&self, name: &str, arguments: Value) -> Result<Success, ToolError> {
        let spec = registry::lookup(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let ValidatedArgs {
            fields,
            custom_message,
        } = args::validate(spec, &arguments, self.config.tools.strict_arguments)?;
        let request = ToolRequest::from_args(spec, fields)?;

        let data = self.call(spec, &request).await?;
        Ok(match custom_message {
            Some(text) => Success::Message(text),
            None => Success::Json(data),
        })
    }

    async fn call(&self, spec: &ToolSpec, request: &ToolRequest) -> Result<Value, ToolError> {
        let body = request.body();
        tracing::info!(tool = spec.name, endpoint = spec.endpoint, "Calling upstream");

        let response = self
            .upstream
            .post(spec.endpoint, &body)
            .await
            .map_err(|e| {
                tracing::warn!(tool = spec.name, error = %e, "Upstream unreachable");
                ToolError::Transport(e.message)
            })?;

        interpret(spec, response)
    }
}

/// Successful tool outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Success {
    /// Parsed upstream JSON body
    Json(Value),
    /// Caller-supplied replacement text
    Message(String),
}

fn interpret(spec: &ToolSpec, response: UpstreamResponse) -> Result<Value, ToolError> {
    if !response.is_success() {
        tracing::warn!(tool = spec.name, status = response.status, "Upstream returned an error status");
        return Err(ToolError::UpstreamHttp {
            status: response.status,
            reason: response.reason,
            body: serde_json::from_slice(&response.body).ok(),
        });
    }

    let data: Value = serde_json::from_slice(&response.body)
        .map_err(|e| ToolError::UpstreamParse(format!("invalid JSON in upstream response: {}", e)))?;
    tracing::debug!(tool = spec.name, response = %data, "Upstream response");
    Ok(data)
}

/// Map any tool failure to the error envelope
pub fn error_result(err: &ToolError, include_error_body: bool) -> ToolResult {
    let mut text = format!("Error: {}", err);
    if include_error_body {
        if let ToolError::UpstreamHttp {
            body: Some(body), ..
        } = err
        {
            if let Ok(pretty) = serde_json::to_string_pretty(body) {
                text.push('\n');
                text.push_str(&pretty);
            }
        }
    }
    ToolResult::error(text)
}
