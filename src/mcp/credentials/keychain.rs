//! macOS Keychain credential provider.
//!
//! Wraps the `security` command-line tool. Entries live under a service key
//! derived from the domain; the account field holds the username and the
//! item secret holds the password.
//!
//! Reads are a two-step lookup: the keychain indexes secrets by
//! (service, account) pairs, so the account must be fetched before the
//! secret can be. The second lookup is the one that triggers the keychain's
//! own user-presence verification (Touch ID or password), which is opaque
//! to this process.
//!
//! Every subprocess call is bounded by a timeout so an unanswered keychain
//! dialog cannot hang the server.

use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::mcp::config::resolve_keychain_timeout;

use super::credential::Credential;
use super::traits::CredentialProvider;

/// Prefix for keychain service keys.
const SERVICE_PREFIX: &str = "ssh-mcp-";

/// Durable credential storage backed by the macOS Keychain.
pub struct KeychainProvider {
    timeout: Duration,
}

impl KeychainProvider {
    /// Create a provider with the configured subprocess timeout
    /// (`SSH_KEYCHAIN_TIMEOUT`, default 30s).
    pub fn new() -> Self {
        Self {
            timeout: resolve_keychain_timeout(None),
        }
    }

    /// Keychain service key for a domain.
    pub(crate) fn service_key(domain: &str) -> String {
        format!("{}{}", SERVICE_PREFIX, domain)
    }

    /// Run `security` with the given arguments, bounded by the timeout.
    ///
    /// Missing binary, timeout, or non-zero exit all normalize to `None`.
    async fn security(&self, args: &[&str]) -> Option<Output> {
        let mut command = Command::new("security");
        command.args(args);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!("security invocation failed: {}", e);
                return None;
            }
            Err(_) => {
                warn!("security invocation timed out after {:?}", self.timeout);
                return None;
            }
        };

        if !output.status.success() {
            debug!("security exited with status {}", output.status);
            return None;
        }

        Some(output)
    }

    /// Run a lookup and return its trimmed stdout, rejecting empty output.
    async fn lookup(&self, args: &[&str]) -> Option<String> {
        let output = self.security(args).await?;
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            debug!("security returned empty output");
            return None;
        }
        Some(value)
    }
}

impl Default for KeychainProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for KeychainProvider {
    async fn resolve(&self, domain: &str) -> Option<Credential> {
        let service = Self::service_key(domain);

        let username = self
            .lookup(&["find-generic-password", "-s", &service, "-w"])
            .await?;

        // Triggers the keychain's user-presence check (Touch ID / password)
        let secret = self
            .lookup(&[
                "find-generic-password",
                "-s",
                &service,
                "-a",
                &username,
                "-w",
            ])
            .await?;

        Some(Credential::new(username, secret))
    }

    async fn store(&self, domain: &str, credential: &Credential) -> bool {
        let service = Self::service_key(domain);

        // Best-effort removal of any existing entry; add below replaces
        // rather than layers.
        let _ = self
            .security(&["delete-generic-password", "-s", &service])
            .await;

        self.security(&[
            "add-generic-password",
            "-s",
            &service,
            "-a",
            credential.username(),
            "-w",
            credential.secret(),
            "-T",
            "",
            "-U",
        ])
        .await
        .is_some()
    }

    fn name(&self) -> &'static str {
        "keychain"
    }

    fn durable(&self) -> bool {
        true
    }
}
