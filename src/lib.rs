//! SSH MCP server with layered credential resolution.
//!
//! Exposes remote-execution tools (shell commands, privileged commands,
//! system facts) over SSH to Linux hosts. Credentials are resolved through
//! an ordered provider chain (macOS Keychain, environment variables,
//! in-process session cache, interactive prompt) managed by
//! [`mcp::credentials::CredentialManager`].

pub mod mcp;
