//! Credential resolution and caching for SSH domains.
//!
//! Credentials are scoped by **domain** (the last two dot-separated labels
//! of a hostname) and resolved through an ordered chain of providers:
//!
//! - [`KeychainProvider`]: macOS Keychain via the `security` CLI (durable)
//! - [`EnvironmentProvider`]: `SSH_USERNAME_*` / `SSH_PASSWORD_*` variables
//! - [`SessionCacheProvider`]: in-process cache, cleared on exit
//! - [`PromptProvider`]: interactive terminal capture, always last
//!
//! [`CredentialManager`] walks the chain in order, mirrors every non-cache
//! hit into the session cache, and degrades every provider failure to an
//! absent result: a broken keychain pushes resolution toward the
//! interactive fallback instead of failing the caller.
//!
//! # Example
//!
//! ```ignore
//! use ssh_keychain_mcp::mcp::credentials::{CredentialManager, domain_from_hostname};
//!
//! let manager = CredentialManager::new();
//! let domain = domain_from_hostname("web01.example.com");
//! let credential = manager.get_credentials(&domain).await?;
//! ```

mod cache;
mod credential;
mod domain;
mod environment;
mod keychain;
mod manager;
mod prompt;
mod traits;

pub use cache::SessionCacheProvider;
pub use credential::{Credential, CredentialError};
pub use domain::domain_from_hostname;
pub use environment::EnvironmentProvider;
pub use keychain::KeychainProvider;
pub use manager::CredentialManager;
pub use prompt::PromptProvider;
pub use traits::CredentialProvider;
