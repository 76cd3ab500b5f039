#![deny(warnings)]
#![deny(clippy::unwrap_used)]

use std::sync::Arc;

use poem_mcpserver::McpServer;
use ssh_keychain_mcp::mcp::McpSshCommands;
use ssh_keychain_mcp::mcp::credentials::CredentialManager;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manager = Arc::new(CredentialManager::new());
    poem_mcpserver::stdio::stdio(McpServer::new().tools(McpSshCommands::new(manager))).await?;
    Ok(())
}
