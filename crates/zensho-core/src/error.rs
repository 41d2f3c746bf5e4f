//! Error types for zensho-core

use std::path::PathBuf;

use serde_json::Value;

/// Result type for zensho-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while setting the adapter up
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parsed but holds an unusable value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Upstream HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// Base URL parse error
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Failure of a single tool invocation
///
/// Every variant is turned into an error envelope by the dispatcher; none of
/// them reaches the MCP caller as a protocol error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolError {
    /// Bad or missing input, detected before any network call
    #[error("invalid arguments for {tool}: {message}")]
    Validation { tool: String, message: String },

    /// No tool registered under this name
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Connection, DNS or request-level failure
    #[error("{0}")]
    Transport(String),

    /// Upstream answered outside the 2xx range
    #[error("HTTP {status} - {reason}")]
    UpstreamHttp {
        status: u16,
        reason: String,
        /// Upstream body, kept only when it was valid JSON
        body: Option<Value>,
    },

    /// Upstream answered 2xx with a body that is not JSON
    #[error("{0}")]
    UpstreamParse(String),
}

impl ToolError {
    pub(crate) fn validation(tool: &str, message: impl Into<String>) -> Self {
        ToolError::Validation {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    /// Whether the failure happened before the upstream was contacted
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ToolError::Validation { .. } | ToolError::UnknownTool(_)
        )
    }
}
