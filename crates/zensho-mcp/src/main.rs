//! Zensho MCP Server
//!
//! A Model Context Protocol server that forwards tool calls to the Zensho
//! automation API.
//!
//! # Usage
//!
//! ```bash
//! zensho-mcp [--config <path>] [--base-url <url>] [--http <addr>] [--strict]
//! ```
//!
//! # Environment Variables
//!
//! - `ZENSHO_API_BASE_URL`: Upstream base URL (overrides the config file)
//! - `RUST_LOG`: Control log verbosity (default: `zensho_mcp=info,zensho_core=info`)
//!
//! # Protocol
//!
//! By default the server communicates via JSON-RPC 2.0 over stdio:
//! - Requests/responses go through stdout
//! - Logs go to stderr (to avoid interfering with the protocol)
//!
//! With `--http` it serves `POST /mcp` instead.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use zensho_core::{Config, Dispatcher, HttpUpstream};
use zensho_mcp::ZenshoMcpServer;

/// MCP server for the Zensho automation API
#[derive(Parser)]
#[command(name = "zensho-mcp")]
#[command(about = "MCP server for the Zensho automation API")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream API base URL
    #[arg(long, env = "ZENSHO_API_BASE_URL")]
    base_url: Option<String>,

    /// Serve MCP over HTTP on this address instead of stdio
    #[arg(long, value_name = "ADDR")]
    http: Option<SocketAddr>,

    /// Reject tool arguments that the tool does not declare
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let config = match (&self.config, &self.base_url) {
            (Some(path), Some(base_url)) => Config::load(path)?.with_base_url(base_url),
            (Some(path), None) => Config::load(path)?,
            (None, Some(base_url)) => Config::new(base_url),
            (None, None) => {
                return Err("no upstream configured: pass --config or --base-url".into());
            }
        };

        let mut config = config;
        if self.strict {
            config.tools.strict_arguments = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging to stderr (stdout is reserved for MCP protocol)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zensho_mcp=info".parse()?)
                .add_directive("zensho_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;

    tracing::info!(
        base_url = %config.upstream.base_url,
        strict = config.tools.strict_arguments,
        "Starting zensho-mcp server"
    );

    let upstream = HttpUpstream::new(&config)?;
    let dispatcher = Dispatcher::new(config, Arc::new(upstream));
    let server = ZenshoMcpServer::new(dispatcher);

    match args.http {
        Some(addr) => zensho_mcp::http::serve(server, addr).await?,
        None => server.run().await?,
    }

    Ok(())
}
