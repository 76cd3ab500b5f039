//! In-process session credential cache.

use async_trait::async_trait;
use dashmap::DashMap;

use super::credential::Credential;
use super::traits::CredentialProvider;

/// Process-lifetime credential cache.
///
/// Holds credentials resolved earlier in the same session so expensive or
/// interactive lookups are not repeated. Entries never touch disk and
/// disappear when the process exits. Pure map operations; cannot fail.
#[derive(Default)]
pub struct SessionCacheProvider {
    entries: DashMap<String, Credential>,
}

impl SessionCacheProvider {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

#[async_trait]
impl CredentialProvider for SessionCacheProvider {
    async fn resolve(&self, domain: &str) -> Option<Credential> {
        self.entries.get(domain).map(|entry| entry.value().clone())
    }

    async fn store(&self, domain: &str, credential: &Credential) -> bool {
        self.entries.insert(domain.to_string(), credential.clone());
        true
    }

    async fn probe(&self, domain: &str) -> bool {
        self.entries.contains_key(domain)
    }

    fn name(&self) -> &'static str {
        "session-cache"
    }

    fn durable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_then_resolve() {
        let cache = SessionCacheProvider::new();
        let credential = Credential::new("admin", "hunter2");

        assert!(cache.store("example.com", &credential).await);
        assert_eq!(cache.resolve("example.com").await, Some(credential));
    }

    #[tokio::test]
    async fn test_miss_is_absent() {
        let cache = SessionCacheProvider::new();
        assert_eq!(cache.resolve("example.com").await, None);
        assert!(!cache.probe("example.com").await);
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_entry() {
        let cache = SessionCacheProvider::new();
        cache
            .store("example.com", &Credential::new("old", "old-secret"))
            .await;
        cache
            .store("example.com", &Credential::new("new", "new-secret"))
            .await;

        let resolved = cache.resolve("example.com").await.expect("cached");
        assert_eq!(resolved.username(), "new");
    }

    #[tokio::test]
    async fn test_domains_are_isolated() {
        let cache = SessionCacheProvider::new();
        cache
            .store("example.com", &Credential::new("admin", "hunter2"))
            .await;

        assert!(cache.probe("example.com").await);
        assert!(!cache.probe("other.net").await);
    }

    #[test]
    fn test_identity() {
        let cache = SessionCacheProvider::new();
        assert_eq!(cache.name(), "session-cache");
        assert!(!cache.durable());
    }
}
