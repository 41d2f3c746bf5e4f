//! MCP Server for the Zensho automation API
//!
//! This crate exposes the upstream ticketing and chat-automation API as Model
//! Context Protocol tools, so agents can browse tickets, reply to issues, read
//! Teams threads or take screenshots through one uniform interface.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client (agent / IDE) ]
//!        | (JSON-RPC over stdio or POST /mcp)
//!        v
//! [ zensho-mcp (MCP Server) ]
//!        | tool name + arguments
//!        v
//! [ zensho-core (Dispatcher) ]
//!        | one JSON POST per call
//!        v
//! [ upstream automation API ]
//! ```
//!
//! # Tools
//!
//! The tool catalog lives in [`zensho_core::registry`]; `tools/list` serves it
//! verbatim.

pub mod error;
pub mod http;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::ZenshoMcpServer;
pub use tools::{ToolDefinition, get_tool_definitions};
pub use zensho_core::{ToolContent, ToolResult};
