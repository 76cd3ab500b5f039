//! Interactive terminal credential capture.
//!
//! Prompts the operator for a username (plain echo) and a secret (masked
//! echo) on the controlling terminal. This path deliberately has no
//! timeout: it is a human-blocking step. Interrupt, end-of-input, and
//! empty input all normalize to an absent result.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use console::Term;
use tracing::debug;

use super::credential::Credential;
use super::traits::CredentialProvider;

/// Terminal read operations, separated from the provider so tests can run
/// without a controlling terminal.
pub(crate) trait TerminalIo: Send + Sync {
    /// Read a line with plain echo.
    fn read_line(&self, prompt: &str) -> io::Result<String>;

    /// Read a line with masked echo.
    fn read_secret(&self, prompt: &str) -> io::Result<String>;
}

/// Real terminal backed by stderr, so prompts never mix with the MCP
/// transport on stdout.
struct StderrTerminal;

impl TerminalIo for StderrTerminal {
    fn read_line(&self, prompt: &str) -> io::Result<String> {
        let term = Term::stderr();
        term.write_str(prompt)?;
        term.read_line()
    }

    fn read_secret(&self, prompt: &str) -> io::Result<String> {
        let term = Term::stderr();
        term.write_str(prompt)?;
        term.read_secure_line()
    }
}

/// Credential source of last resort: ask the operator.
///
/// `store` is a no-op returning failure: interactively captured secrets
/// are transient and only reach persistent storage through the explicit
/// authenticate flow.
pub struct PromptProvider {
    io: Arc<dyn TerminalIo>,
}

impl PromptProvider {
    /// Create a provider reading from the controlling terminal.
    pub fn new() -> Self {
        Self {
            io: Arc::new(StderrTerminal),
        }
    }

    /// Create a provider over a custom terminal, for tests.
    #[cfg(test)]
    pub(crate) fn with_io(io: Arc<dyn TerminalIo>) -> Self {
        Self { io }
    }

    /// Blocking capture of a username/secret pair.
    ///
    /// Empty trimmed username cancels the flow before the secret prompt is
    /// shown; empty trimmed secret cancels it after.
    fn capture(io: &dyn TerminalIo, domain: &str) -> Option<Credential> {
        let username = io
            .read_line(&format!("Username for {}: ", domain))
            .ok()?
            .trim()
            .to_string();
        if username.is_empty() {
            debug!("Username prompt cancelled for {}", domain);
            return None;
        }

        let secret = io
            .read_secret(&format!("Password for {}@{}: ", username, domain))
            .ok()?;
        if secret.trim().is_empty() {
            debug!("Secret prompt cancelled for {}", domain);
            return None;
        }

        Some(Credential::new(username, secret))
    }
}

impl Default for PromptProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for PromptProvider {
    async fn resolve(&self, domain: &str) -> Option<Credential> {
        let io = self.io.clone();
        let domain = domain.to_string();

        // Terminal reads block; keep them off the async workers. A panicked
        // or aborted task normalizes to absent like any other failure.
        tokio::task::spawn_blocking(move || Self::capture(io.as_ref(), &domain))
            .await
            .ok()
            .flatten()
    }

    async fn store(&self, _domain: &str, _credential: &Credential) -> bool {
        false
    }

    async fn probe(&self, _domain: &str) -> bool {
        // A live prompt can always synthesize a credential
        true
    }

    fn name(&self) -> &'static str {
        "prompt"
    }

    fn durable(&self) -> bool {
        false
    }
}
