//! Adapter configuration
//!
//! The configuration is built once at startup and handed to the dispatcher.
//! It is usually read from a TOML file:
//!
//! ```toml
//! [upstream]
//! base_url = "https://automation.example.com"
//!
//! [upstream.headers]
//! "ngrok-skip-browser-warning" = "true"
//!
//! [tools]
//! strict_arguments = false
//! include_error_body = true
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

fn default_include_error_body() -> bool {
    true
}

/// Where and how to reach the upstream API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Scheme, host and optional path prefix; endpoints are appended to it
    pub base_url: String,

    /// Static headers sent with every request, in addition to `Content-Type`
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Tool-call behavior switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Reject arguments that the tool does not declare instead of dropping them
    #[serde(default)]
    pub strict_arguments: bool,

    /// Append the upstream JSON body to `HTTP <status>` error texts
    #[serde(default = "default_include_error_body")]
    pub include_error_body: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            strict_arguments: false,
            include_error_body: default_include_error_body(),
        }
    }
}

/// Complete adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Configuration with defaults for everything but the base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            upstream: UpstreamConfig {
                base_url: base_url.into(),
                headers: BTreeMap::new(),
            },
            tools: ToolsConfig::default(),
        }
    }

    /// Parse and validate configuration from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Replace the base URL, e.g. from a command-line override
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.upstream.base_url = base_url.into();
        self
    }

    /// Check that the base URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.upstream.base_url)?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::InvalidConfig {
                    message: format!("base_url scheme must be http or https, got {}", other),
                });
            }
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(Error::InvalidConfig {
                message: "base_url must not carry a query or fragment".to_string(),
            });
        }
        Ok(())
    }

    /// Full URL of an endpoint path
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.upstream.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}
