//! Credential provider trait definition.
//!
//! Each provider wraps one credential source (keychain, environment,
//! in-process cache, interactive prompt) and owns only its private backing
//! state. Implementations must be thread-safe (`Send + Sync`) for use
//! across async tasks.

use async_trait::async_trait;

use super::credential::Credential;

/// One source of credentials, keyed by domain.
///
/// None of these operations error: any internal failure (missing binary,
/// non-zero exit, timeout, cancelled prompt) normalizes to an absent
/// result or a `false` success flag so the manager's fallback chain is
/// never interrupted.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Resolve the credential for a domain, or absent.
    async fn resolve(&self, domain: &str) -> Option<Credential>;

    /// Attempt to persist a credential for a domain.
    ///
    /// Providers without persistence semantics return `false` without side
    /// effects.
    async fn store(&self, domain: &str, credential: &Credential) -> bool;

    /// Whether `resolve` would currently return a credential.
    ///
    /// Providers that can always synthesize a credential (the interactive
    /// prompt) override this to return `true` unconditionally.
    async fn probe(&self, domain: &str) -> bool {
        self.resolve(domain).await.is_some()
    }

    /// Name of this provider, for logging and cache-identity checks.
    fn name(&self) -> &'static str;

    /// Whether `store` persists beyond process exit.
    fn durable(&self) -> bool;
}
