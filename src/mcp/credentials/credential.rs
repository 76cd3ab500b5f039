//! Credential value type and resolution error.

use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A username/secret pair scoped to a credential domain.
///
/// The secret is wiped from memory when the value drops. This is a
/// best-effort mitigation: intermediate copies made by the runtime or by
/// consumers are outside its reach. Never logged; the `Debug` impl redacts
/// the secret.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    username: String,
    secret: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Username for authentication.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Secret for authentication.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username && self.secret == other.secret
    }
}

impl Eq for Credential {}

/// Terminal outcome of a failed credential resolution.
///
/// Provider-level faults never surface individually; the only observable
/// failure is the whole chain coming up empty.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// Every provider in the chain returned absent for this domain.
    #[error("no credentials found for domain '{domain}'")]
    NotFound { domain: String },
}
