//! Serializable response types for MCP SSH tools.
//!
//! All types implement `Serialize`, `Deserialize`, and `JsonSchema` for
//! proper MCP protocol compatibility.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Result of a remote command execution.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SshCommandResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// Whether the command timed out (partial output may be available)
    #[serde(default)]
    pub timed_out: bool,
}

/// Result of an interactive credential authentication flow.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AuthenticateResponse {
    /// Whether credentials were captured and stored
    pub success: bool,
    /// Credential-scoping domain the flow ran for
    pub domain: String,
    /// Human-readable outcome message
    pub message: String,
}
