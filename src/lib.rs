//! featurevote server: HTTP API, MCP tools and configuration on top of
//! [`featurevote_core`].

pub mod api;
pub mod config;
pub mod mcp;

pub use featurevote_core::{db, models};
