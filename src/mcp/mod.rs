//! MCP SSH module providing remote execution tools backed by layered
//! credential resolution.
//!
//! This module is organized into the following submodules:
//!
//! - `types`: Serializable response types for MCP tools
//! - `config`: Configuration resolution with environment variable support
//! - `error`: Error classification for connect retry logic
//! - `session`: SSH client handler (host key policy)
//! - `client`: SSH connection and command execution logic
//! - `credentials`: Credential providers, fallback chain, and caching
//! - `commands`: MCP tool implementations

pub(crate) mod client;
pub mod commands;
pub(crate) mod config;
pub mod credentials;
pub(crate) mod error;
pub mod session;
pub mod types;

pub use commands::McpSshCommands;
