#![deny(warnings)]
#![deny(clippy::unwrap_used)]

use std::sync::Arc;

use dotenv::dotenv;
use poem::{EndpointExt, Route, Server, listener::TcpListener, middleware::Tracing};
use poem_mcpserver::{McpServer, streamable_http};
use ssh_keychain_mcp::mcp::McpSshCommands;
use ssh_keychain_mcp::mcp::credentials::CredentialManager;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Initialize logging with proper tracing default
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().expect("valid directive")),
        )
        .init();

    // Setup MCP server
    let mcp_port: u16 = std::env::var("MCP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let mcp_addr = format!("0.0.0.0:{}", mcp_port);
    info!("Starting MCP server on {}", mcp_addr);

    // One explicitly constructed manager shared by every tool invocation;
    // the provider order is fixed here for the process lifetime.
    let manager = Arc::new(CredentialManager::new());

    // Setup the poem-mcpserver endpoint with SSH commands
    let app = Route::new()
        .at(
            "/",
            streamable_http::endpoint(move |_| {
                McpServer::new().tools(McpSshCommands::new(manager.clone()))
            }),
        )
        .with(Tracing);

    info!("MCP Server with SSH credential resolution is ready");
    info!("Use execute_ssh / execute_sudo to run commands on remote hosts");
    info!("Use authenticate_domain to store credentials for a domain");

    // Run the MCP server
    Server::new(TcpListener::bind(mcp_addr))
        .name("SSH Keychain MCP Server")
        .run(app)
        .await?;

    Ok(())
}
