//! Core of the Zensho MCP adapter
//!
//! Exposes a fixed catalog of tools and forwards each call to a single
//! upstream REST API as one JSON POST, reshaping the HTTP outcome into an MCP
//! tool result.
//!
//! ```text
//! [ MCP server (zensho-mcp) ]
//!        | tool name + JSON arguments
//!        v
//! [ Dispatcher ] --lookup--> [ registry ]
//!        | validate, normalize, typed body
//!        v
//! [ Upstream (reqwest) ] --POST base_url + endpoint--> [ automation API ]
//! ```
//!
//! All domain behavior (ticket creation, Teams automation, screenshots) lives
//! in the upstream API; this crate only validates and forwards.

pub mod args;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod request;
pub mod result;
pub mod upstream;

pub use config::Config;
pub use dispatcher::{Dispatcher, Success, error_result};
pub use error::{Error, Result, ToolError};
pub use registry::{FieldKind, FieldSpec, ToolSpec};
pub use request::ToolRequest;
pub use result::{ToolContent, ToolResult};
pub use upstream::{HttpUpstream, Upstream, UpstreamError, UpstreamResponse};
