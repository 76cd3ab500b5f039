//! Credential manager: ordered fallback chain with write-back caching.
//!
//! Providers are walked in a fixed order decided at construction. The first
//! provider to produce a credential wins, and any non-cache hit is mirrored
//! into the session cache so repeated lookups in the same process skip the
//! expensive (or interactive) source. A provider that fails internally
//! simply contributes an absent result; nothing a provider does can abort
//! an operation on this manager.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cache::SessionCacheProvider;
use super::credential::{Credential, CredentialError};
use super::environment::EnvironmentProvider;
use super::keychain::KeychainProvider;
use super::prompt::PromptProvider;
use super::traits::CredentialProvider;

/// Orders credential providers and implements lookup-with-fallback,
/// opportunistic caching, and store/authenticate operations.
///
/// Construct one explicitly and share it via `Arc`; the manager holds no
/// interior locking beyond the session cache's map.
pub struct CredentialManager {
    /// Fixed provider order: durable secure backends first, the session
    /// cache and the interactive prompt always last.
    providers: Vec<Arc<dyn CredentialProvider>>,
    /// The chain's cache entry, reachable directly for write-back and
    /// fast-path reads.
    cache: Arc<SessionCacheProvider>,
    /// The chain's prompt entry, reachable directly for the explicit
    /// authenticate flow.
    prompt: Arc<PromptProvider>,
}

impl CredentialManager {
    /// Build the platform's provider chain.
    ///
    /// The keychain provider is only included where the host OS supports
    /// it (macOS).
    pub fn new() -> Self {
        let cache = Arc::new(SessionCacheProvider::new());
        let prompt = Arc::new(PromptProvider::new());

        let mut providers: Vec<Arc<dyn CredentialProvider>> = Vec::new();
        if cfg!(target_os = "macos") {
            providers.push(Arc::new(KeychainProvider::new()));
        }
        providers.push(Arc::new(EnvironmentProvider::new()));
        providers.push(cache.clone());
        providers.push(prompt.clone());

        Self::with_chain(providers, cache, prompt)
    }

    /// Build a manager over an explicit chain.
    ///
    /// `cache` and `prompt` are the distinguished instances the manager
    /// reaches directly; they normally also appear in `providers`.
    fn with_chain(
        providers: Vec<Arc<dyn CredentialProvider>>,
        cache: Arc<SessionCacheProvider>,
        prompt: Arc<PromptProvider>,
    ) -> Self {
        debug!(
            "Credential provider chain: [{}]",
            providers
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Self {
            providers,
            cache,
            prompt,
        }
    }

    /// Resolve credentials for a domain through the provider chain.
    ///
    /// The session cache is consulted first so a lookup that already
    /// succeeded this session never re-invokes its source. A hit from any
    /// other provider is mirrored into the cache best-effort before being
    /// returned. When every provider comes up absent the result is a typed
    /// [`CredentialError::NotFound`] carrying the domain.
    pub async fn get_credentials(&self, domain: &str) -> Result<Credential, CredentialError> {
        if let Some(credential) = self.cache.resolve(domain).await {
            debug!("Credentials for {} served from session cache", domain);
            return Ok(credential);
        }

        for provider in &self.providers {
            let Some(credential) = provider.resolve(domain).await else {
                debug!("Provider {} has no credentials for {}", provider.name(), domain);
                continue;
            };

            info!(
                "Credentials for {} resolved by provider {}",
                domain,
                provider.name()
            );

            if provider.name() != self.cache.name() {
                // Opportunistic write-back; a caching failure is ignored
                let _ = self.cache.store(domain, &credential).await;
            }

            return Ok(credential);
        }

        Err(CredentialError::NotFound {
            domain: domain.to_string(),
        })
    }

    /// Persist credentials for a domain.
    ///
    /// Tries every durable provider in chain order; the first success is
    /// mirrored into the session cache and wins. When no durable provider
    /// accepts the write the credential is kept in the session cache alone,
    /// and that still counts as success: "stored" means available for the
    /// remainder of this session, not necessarily beyond process exit.
    pub async fn store_credentials(&self, domain: &str, username: &str, secret: &str) -> bool {
        let credential = Credential::new(username, secret);

        for provider in &self.providers {
            if !provider.durable() {
                continue;
            }

            if provider.store(domain, &credential).await {
                info!(
                    "Credentials for {} stored by provider {}",
                    domain,
                    provider.name()
                );
                let _ = self.cache.store(domain, &credential).await;
                return true;
            }

            warn!(
                "Provider {} failed to store credentials for {}",
                provider.name(),
                domain
            );
        }

        info!("Credentials for {} kept in session cache only", domain);
        self.cache.store(domain, &credential).await
    }

    /// Whether any provider can currently produce credentials for a domain.
    pub async fn test_credentials_available(&self, domain: &str) -> bool {
        for provider in &self.providers {
            if provider.probe(domain).await {
                debug!(
                    "Provider {} reports credentials available for {}",
                    provider.name(),
                    domain
                );
                return true;
            }
        }
        false
    }

    /// Interactively capture and store credentials for a domain.
    ///
    /// Empty username or secret cancels the flow. The captured secret is
    /// dropped (and wiped) as soon as the store attempt finishes, whether
    /// or not it succeeded.
    pub async fn authenticate_domain(&self, domain: &str) -> bool {
        let Some(credential) = self.prompt.resolve(domain).await else {
            warn!("Interactive authentication cancelled for {}", domain);
            return false;
        };

        let stored = self
            .store_credentials(domain, credential.username(), credential.secret())
            .await;
        drop(credential); // secret wiped here

        stored
    }
}

impl Default for CredentialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::super::prompt::TerminalIo;

    /// Provider with a fixed answer and call counters.
    struct ScriptedProvider {
        name: &'static str,
        durable: bool,
        credential: Option<Credential>,
        accepts_store: bool,
        resolve_calls: AtomicUsize,
        store_calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn absent(name: &'static str) -> Self {
            Self {
                name,
                durable: false,
                credential: None,
                accepts_store: false,
                resolve_calls: AtomicUsize::new(0),
                store_calls: AtomicUsize::new(0),
            }
        }

        fn with_credential(name: &'static str, credential: Credential) -> Self {
            Self {
                credential: Some(credential),
                ..Self::absent(name)
            }
        }

        fn into_durable(mut self, accepts_store: bool) -> Self {
            self.durable = true;
            self.accepts_store = accepts_store;
            self
        }

        fn resolve_count(&self) -> usize {
            self.resolve_calls.load(Ordering::SeqCst)
        }

        fn store_count(&self) -> usize {
            self.store_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CredentialProvider for ScriptedProvider {
        async fn resolve(&self, _domain: &str) -> Option<Credential> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            self.credential.clone()
        }

        async fn store(&self, _domain: &str, _credential: &Credential) -> bool {
            self.store_calls.fetch_add(1, Ordering::SeqCst);
            self.accepts_store
        }

        fn name(&self) -> &'static str {
            self.name
        }

        fn durable(&self) -> bool {
            self.durable
        }
    }

    /// Terminal that refuses every read, or answers with a fixed pair.
    struct ScriptedTerminal {
        answers: Option<(String, String)>,
    }

    impl TerminalIo for ScriptedTerminal {
        fn read_line(&self, _prompt: &str) -> io::Result<String> {
            match &self.answers {
                Some((username, _)) => Ok(username.clone()),
                None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "eof")),
            }
        }

        fn read_secret(&self, _prompt: &str) -> io::Result<String> {
            match &self.answers {
                Some((_, secret)) => Ok(secret.clone()),
                None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "eof")),
            }
        }
    }

    fn refusing_prompt() -> Arc<PromptProvider> {
        Arc::new(PromptProvider::with_io(Arc::new(ScriptedTerminal {
            answers: None,
        })))
    }

    fn answering_prompt(username: &str, secret: &str) -> Arc<PromptProvider> {
        Arc::new(PromptProvider::with_io(Arc::new(ScriptedTerminal {
            answers: Some((username.to_string(), secret.to_string())),
        })))
    }

    /// Manager over [durable, extra..., cache, prompt] mirroring the
    /// production chain shape.
    fn manager_with(
        head: Vec<Arc<dyn CredentialProvider>>,
        prompt: Arc<PromptProvider>,
    ) -> (CredentialManager, Arc<SessionCacheProvider>) {
        let cache = Arc::new(SessionCacheProvider::new());
        let mut providers = head;
        providers.push(cache.clone());
        providers.push(prompt.clone());
        (
            CredentialManager::with_chain(providers, cache.clone(), prompt),
            cache,
        )
    }

    #[tokio::test]
    async fn test_second_lookup_served_from_cache() {
        let durable = Arc::new(
            ScriptedProvider::with_credential("durable", Credential::new("admin", "hunter2"))
                .into_durable(true),
        );
        let (manager, _cache) = manager_with(vec![durable.clone() as Arc<dyn CredentialProvider>], refusing_prompt());

        let first = manager.get_credentials("example.com").await.expect("found");
        let second = manager.get_credentials("example.com").await.expect("found");

        assert_eq!(first, second);
        // The durable provider must not be re-invoked once the cache holds
        // the pair.
        assert_eq!(durable.resolve_count(), 1);
    }

    #[tokio::test]
    async fn test_fallback_skips_absent_providers_without_prompting() {
        let durable = Arc::new(ScriptedProvider::absent("durable").into_durable(true));
        let environment = Arc::new(ScriptedProvider::with_credential(
            "environment",
            Credential::new("env-user", "env-secret"),
        ));
        let trailing = Arc::new(ScriptedProvider::absent("trailing"));
        let (manager, _cache) = manager_with(
            vec![
                durable.clone() as Arc<dyn CredentialProvider>,
                environment.clone(),
                trailing.clone(),
            ],
            refusing_prompt(),
        );

        let resolved = manager.get_credentials("example.com").await.expect("found");

        assert_eq!(resolved, Credential::new("env-user", "env-secret"));
        assert_eq!(durable.resolve_count(), 1);
        // Providers after the first hit are never consulted
        assert_eq!(trailing.resolve_count(), 0);
    }

    #[tokio::test]
    async fn test_non_cache_hit_is_written_back_to_cache() {
        let durable = Arc::new(
            ScriptedProvider::with_credential("durable", Credential::new("admin", "hunter2"))
                .into_durable(true),
        );
        let (manager, cache) = manager_with(vec![durable as Arc<dyn CredentialProvider>], refusing_prompt());

        manager.get_credentials("example.com").await.expect("found");

        // Queried directly, the cache alone must now hold the same pair
        assert_eq!(
            cache.resolve("example.com").await,
            Some(Credential::new("admin", "hunter2"))
        );
    }

    #[tokio::test]
    async fn test_store_success_mirrors_to_cache_and_stops() {
        let durable = Arc::new(ScriptedProvider::absent("durable").into_durable(true));
        let second_durable = Arc::new(ScriptedProvider::absent("second-durable").into_durable(true));
        let (manager, cache) = manager_with(
            vec![
                durable.clone() as Arc<dyn CredentialProvider>,
                second_durable.clone(),
            ],
            refusing_prompt(),
        );

        assert!(
            manager
                .store_credentials("example.com", "admin", "hunter2")
                .await
        );

        assert_eq!(durable.store_count(), 1);
        // First durable success wins; later durable providers are not tried
        assert_eq!(second_durable.store_count(), 0);
        assert_eq!(
            cache.resolve("example.com").await,
            Some(Credential::new("admin", "hunter2"))
        );

        // Subsequent lookups are served from the cache, not the durable
        // provider
        let resolved = manager.get_credentials("example.com").await.expect("found");
        assert_eq!(resolved, Credential::new("admin", "hunter2"));
        assert_eq!(durable.resolve_count(), 0);
    }

    #[tokio::test]
    async fn test_store_falls_back_to_session_cache_and_still_succeeds() {
        let durable = Arc::new(
            ScriptedProvider::absent("durable")
                // durable provider that rejects every write
                .into_durable(false),
        );
        let (manager, _cache) = manager_with(vec![durable.clone() as Arc<dyn CredentialProvider>], refusing_prompt());

        assert!(
            manager
                .store_credentials("example.com", "admin", "hunter2")
                .await
        );
        assert_eq!(durable.store_count(), 1);

        // "Stored" means retrievable for the rest of the session
        let resolved = manager.get_credentials("example.com").await.expect("found");
        assert_eq!(resolved, Credential::new("admin", "hunter2"));
    }

    #[tokio::test]
    async fn test_store_without_any_durable_provider_succeeds() {
        let (manager, _cache) = manager_with(Vec::new(), refusing_prompt());

        assert!(
            manager
                .store_credentials("example.com", "admin", "hunter2")
                .await
        );
        let resolved = manager.get_credentials("example.com").await.expect("found");
        assert_eq!(resolved, Credential::new("admin", "hunter2"));
    }

    #[tokio::test]
    async fn test_faulty_provider_does_not_break_the_chain() {
        // A provider whose internals fail reports absent; the chain must
        // continue and still produce an overall result.
        let faulty = Arc::new(ScriptedProvider::absent("faulty").into_durable(true));
        let healthy = Arc::new(ScriptedProvider::with_credential(
            "healthy",
            Credential::new("admin", "hunter2"),
        ));
        let (manager, _cache) = manager_with(
            vec![faulty.clone() as Arc<dyn CredentialProvider>, healthy],
            refusing_prompt(),
        );

        let resolved = manager.get_credentials("example.com").await.expect("found");

        assert_eq!(faulty.resolve_count(), 1);
        assert_eq!(resolved, Credential::new("admin", "hunter2"));
    }

    #[tokio::test]
    async fn test_exhausted_chain_reports_not_found_with_domain() {
        let durable = Arc::new(ScriptedProvider::absent("durable").into_durable(true));
        let cache = Arc::new(SessionCacheProvider::new());
        // Chain without the prompt: nothing can synthesize a credential
        let manager = CredentialManager::with_chain(
            vec![durable as Arc<dyn CredentialProvider>, cache.clone()],
            cache,
            refusing_prompt(),
        );

        let err = manager
            .get_credentials("example.com")
            .await
            .expect_err("absent");
        assert_eq!(
            err,
            CredentialError::NotFound {
                domain: "example.com".to_string()
            }
        );
        assert!(err.to_string().contains("example.com"));
    }

    #[tokio::test]
    async fn test_availability_reflects_provider_probes() {
        let durable = Arc::new(ScriptedProvider::absent("durable").into_durable(true));
        let cache = Arc::new(SessionCacheProvider::new());
        let manager = CredentialManager::with_chain(
            vec![durable as Arc<dyn CredentialProvider>, cache.clone()],
            cache.clone(),
            refusing_prompt(),
        );

        assert!(!manager.test_credentials_available("example.com").await);

        cache
            .store("example.com", &Credential::new("admin", "hunter2"))
            .await;
        assert!(manager.test_credentials_available("example.com").await);
    }

    #[tokio::test]
    async fn test_availability_always_true_with_prompt_in_chain() {
        // The interactive prompt can always synthesize a credential, so a
        // full chain reports availability unconditionally.
        let (manager, _cache) = manager_with(Vec::new(), refusing_prompt());
        assert!(manager.test_credentials_available("example.com").await);
    }

    #[tokio::test]
    async fn test_authenticate_domain_stores_captured_pair() {
        let durable = Arc::new(ScriptedProvider::absent("durable").into_durable(true));
        let (manager, cache) = manager_with(
            vec![durable.clone() as Arc<dyn CredentialProvider>],
            answering_prompt("admin", "hunter2"),
        );

        assert!(manager.authenticate_domain("example.com").await);

        // The durable store was attempted and the pair is session-available
        assert_eq!(durable.store_count(), 1);
        assert_eq!(
            cache.resolve("example.com").await,
            Some(Credential::new("admin", "hunter2"))
        );
    }

    #[tokio::test]
    async fn test_authenticate_domain_cancelled_prompt_fails() {
        let durable = Arc::new(ScriptedProvider::absent("durable").into_durable(true));
        let (manager, cache) = manager_with(vec![durable.clone() as Arc<dyn CredentialProvider>], refusing_prompt());

        assert!(!manager.authenticate_domain("example.com").await);
        assert_eq!(durable.store_count(), 0);
        assert_eq!(cache.resolve("example.com").await, None);
    }

    #[tokio::test]
    async fn test_default_chain_ends_with_cache_and_prompt() {
        let manager = CredentialManager::new();
        let names: Vec<_> = manager.providers.iter().map(|p| p.name()).collect();

        let len = names.len();
        assert!(len >= 2);
        assert_eq!(names[len - 2], "session-cache");
        assert_eq!(names[len - 1], "prompt");
        assert!(names.contains(&"environment"));
        if cfg!(target_os = "macos") {
            assert_eq!(names[0], "keychain");
        } else {
            assert!(!names.contains(&"keychain"));
        }
    }
}
