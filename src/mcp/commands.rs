//! MCP SSH tool implementations.
//!
//! This module provides the MCP tools for remote execution against Linux
//! hosts:
//!
//! - `execute_ssh`: Run a shell command on a remote host
//! - `execute_sudo`: Run a command under sudo (secret fed via stdin)
//! - `authenticate_domain`: Interactively capture and store credentials
//! - `ssh_get_system_info` / `get_running_processes` / `get_disk_usage` /
//!   `get_services`: canned system-fact commands
//! - `ssh_puppet_noop`: Puppet dry run with a lock-file guard
//!
//! Credentials are resolved per call from the shared
//! [`CredentialManager`], keyed by the hostname's domain, and wiped as soon
//! as the SSH exchange finishes.

use std::sync::Arc;

use poem_mcpserver::{Tools, content::Text, tool::StructuredContent};
use russh::Disconnect;
use tracing::{error, info};

use super::client::{connect_with_retry, execute_command, execute_sudo_command};
use super::config::{
    resolve_command_timeout, resolve_compression, resolve_connect_timeout, resolve_max_retries,
    resolve_retry_delay,
};
use super::credentials::{CredentialManager, domain_from_hostname};
use super::types::{AuthenticateResponse, SshCommandResponse};

/// Command used by `ssh_get_system_info`.
const SYSTEM_INFO_COMMAND: &str = "uname -a && cat /etc/os-release | head -5 && free -h && df -h /";

/// Command used by `get_running_processes`.
const TOP_PROCESSES_COMMAND: &str = "ps aux --sort=-%cpu | head -10";

/// Command used by `get_disk_usage`.
const DISK_USAGE_COMMAND: &str = "df -h";

/// Command used by `get_services`.
const RUNNING_SERVICES_COMMAND: &str =
    "systemctl list-units --type=service --state=running --no-pager | head -20";

/// Puppet agent lock file checked before a no-op run.
const PUPPET_LOCK_FILE: &str = "/var/lib/puppet/state/agent_catalog_run.lock";

/// Whether a remote command runs plainly or under sudo.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Elevation {
    None,
    Sudo,
}

/// MCP SSH tools backed by a shared credential manager.
pub struct McpSshCommands {
    manager: Arc<CredentialManager>,
}

impl McpSshCommands {
    /// Create the tool set over an explicitly constructed manager.
    pub fn new(manager: Arc<CredentialManager>) -> Self {
        Self { manager }
    }

    /// Remediation message for a domain with no resolvable credentials.
    fn no_credentials_help(domain: &str) -> String {
        format!(
            "No credentials found for {}. Use authenticate_domain(\"{}\") to store credentials securely first.",
            domain, domain
        )
    }

    /// Resolve credentials, connect, run one command, and disconnect.
    ///
    /// The resolved credential is dropped (and its secret wiped) as soon as
    /// the SSH exchange finishes, on success and on failure alike.
    async fn run_remote(
        &self,
        hostname: &str,
        command: &str,
        timeout_secs: Option<u64>,
        elevation: Elevation,
    ) -> Result<SshCommandResponse, String> {
        let domain = domain_from_hostname(hostname);

        if !self.manager.test_credentials_available(&domain).await {
            return Err(Self::no_credentials_help(&domain));
        }

        let credential = self
            .manager
            .get_credentials(&domain)
            .await
            .map_err(|_| Self::no_credentials_help(&domain))?;

        let connect_timeout = resolve_connect_timeout(None);
        let command_timeout = resolve_command_timeout(timeout_secs);

        let connected = connect_with_retry(
            hostname,
            credential.username(),
            credential.secret(),
            connect_timeout,
            resolve_max_retries(None),
            resolve_retry_delay(None),
            resolve_compression(None),
        )
        .await;

        let handle = match connected {
            Ok((handle, _retries)) => handle,
            Err(e) => {
                error!("SSH connection to {} failed: {}", hostname, e);
                return Err(e);
            }
        };

        let result = match elevation {
            Elevation::None => execute_command(&handle, command, command_timeout).await,
            Elevation::Sudo => {
                execute_sudo_command(&handle, command, credential.secret(), command_timeout).await
            }
        };
        // Hand-off complete: wipe the secret before surfacing the result
        drop(credential);

        let _ = handle
            .disconnect(Disconnect::ByApplication, "command complete", "en")
            .await;

        result
    }
}

#[Tools]
impl McpSshCommands {
    /// Execute a command on a remote Linux host via SSH.
    ///
    /// Credentials are resolved automatically for the host's domain
    /// (keychain, environment variables, session cache, then an interactive
    /// prompt). Use `authenticate_domain` first to store credentials for
    /// unattended use.
    async fn execute_ssh(
        &self,
        /// Remote host, "host" or "host:port" (default port 22)
        hostname: String,
        /// Shell command to execute on the remote host
        command: String,
        /// Command execution timeout in seconds (default: 180, env: SSH_COMMAND_TIMEOUT)
        timeout_secs: Option<u64>,
    ) -> Result<StructuredContent<SshCommandResponse>, String> {
        info!("Executing command on {}", hostname);
        let response = self
            .run_remote(&hostname, &command, timeout_secs, Elevation::None)
            .await?;
        Ok(StructuredContent(response))
    }

    /// Execute a command with sudo on a remote Linux host.
    ///
    /// The command runs under `sudo -S`; the account password is sent via
    /// stdin so it never appears on the remote command line, and the sudo
    /// password prompt is stripped from stderr.
    async fn execute_sudo(
        &self,
        /// Remote host, "host" or "host:port" (default port 22)
        hostname: String,
        /// Shell command to execute under sudo
        command: String,
        /// Command execution timeout in seconds (default: 180, env: SSH_COMMAND_TIMEOUT)
        timeout_secs: Option<u64>,
    ) -> Result<StructuredContent<SshCommandResponse>, String> {
        info!("Executing sudo command on {}", hostname);
        let response = self
            .run_remote(&hostname, &command, timeout_secs, Elevation::Sudo)
            .await?;
        Ok(StructuredContent(response))
    }

    /// Interactively authenticate and securely store credentials for a domain.
    ///
    /// Prompts the operator on the server's terminal for a username and a
    /// masked password, then stores them in the most durable backend
    /// available (macOS Keychain where supported, otherwise the session
    /// cache).
    async fn authenticate_domain(
        &self,
        /// Credential-scoping domain, e.g. "example.com"
        domain: String,
    ) -> Result<StructuredContent<AuthenticateResponse>, String> {
        info!("Interactive authentication requested for {}", domain);
        let success = self.manager.authenticate_domain(&domain).await;

        let message = if success {
            format!("Credentials stored securely for {}", domain)
        } else {
            format!("Failed to capture or store credentials for {}", domain)
        };

        Ok(StructuredContent(AuthenticateResponse {
            success,
            domain,
            message,
        }))
    }

    /// Check whether credentials can be resolved for a hostname's domain.
    async fn check_credentials(
        &self,
        /// Remote host whose domain should be checked
        hostname: String,
    ) -> Result<Text<String>, String> {
        let domain = domain_from_hostname(&hostname);
        if self.manager.test_credentials_available(&domain).await {
            Ok(Text(format!("Credentials are available for {}", domain)))
        } else {
            Err(Self::no_credentials_help(&domain))
        }
    }

    /// Get basic system information from a Linux host.
    async fn ssh_get_system_info(
        &self,
        /// Remote host, "host" or "host:port" (default port 22)
        hostname: String,
    ) -> Result<StructuredContent<SshCommandResponse>, String> {
        let response = self
            .run_remote(&hostname, SYSTEM_INFO_COMMAND, None, Elevation::None)
            .await?;
        Ok(StructuredContent(response))
    }

    /// Get the top CPU-consuming processes from a Linux host.
    async fn get_running_processes(
        &self,
        /// Remote host, "host" or "host:port" (default port 22)
        hostname: String,
    ) -> Result<StructuredContent<SshCommandResponse>, String> {
        let response = self
            .run_remote(&hostname, TOP_PROCESSES_COMMAND, None, Elevation::None)
            .await?;
        Ok(StructuredContent(response))
    }

    /// Get disk usage information from a Linux host.
    async fn get_disk_usage(
        &self,
        /// Remote host, "host" or "host:port" (default port 22)
        hostname: String,
    ) -> Result<StructuredContent<SshCommandResponse>, String> {
        let response = self
            .run_remote(&hostname, DISK_USAGE_COMMAND, None, Elevation::None)
            .await?;
        Ok(StructuredContent(response))
    }

    /// Get running systemd services from a Linux host.
    async fn get_services(
        &self,
        /// Remote host, "host" or "host:port" (default port 22)
        hostname: String,
    ) -> Result<StructuredContent<SshCommandResponse>, String> {
        let response = self
            .run_remote(&hostname, RUNNING_SERVICES_COMMAND, None, Elevation::None)
            .await?;
        Ok(StructuredContent(response))
    }

    /// Run the Puppet agent in no-op mode (dry run) with verbose output.
    ///
    /// Refuses to start when an agent run is already in progress (lock file
    /// present), so concurrent catalog runs never race.
    async fn ssh_puppet_noop(
        &self,
        /// Remote host, "host" or "host:port" (default port 22)
        hostname: String,
    ) -> Result<StructuredContent<SshCommandResponse>, String> {
        let lock_check_command = format!("ls {} 2>/dev/null", PUPPET_LOCK_FILE);
        let lock_check = self
            .run_remote(&hostname, &lock_check_command, None, Elevation::Sudo)
            .await?;

        if lock_check.exit_code == 0 {
            return Err(format!(
                "Puppet agent is already running (lock file exists: {}). Wait for it to complete, or remove the lock file if stuck.",
                PUPPET_LOCK_FILE
            ));
        }

        let response = self
            .run_remote(&hostname, "puppet agent -vt --noop", None, Elevation::Sudo)
            .await?;
        Ok(StructuredContent(response))
    }
}
