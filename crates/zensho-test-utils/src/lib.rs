//! Shared test utilities for the zensho workspace.
//!
//! Dev-dependency only; never published.
//!
//! # Modules
//!
//! - [`recording`]: in-process [`Upstream`](zensho_core::Upstream) double that
//!   counts and records calls without any socket
//! - [`server`]: real local HTTP upstream on an ephemeral port

pub mod recording;
pub mod server;

pub use recording::RecordingUpstream;
pub use server::{MockServer, RecordedRequest, Reply, refused_base_url};
