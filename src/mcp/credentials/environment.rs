//! Environment variable credential lookup.

use std::env;

use async_trait::async_trait;
use tracing::debug;

use super::credential::Credential;
use super::traits::CredentialProvider;

/// Read-only credential source backed by environment variables.
///
/// For domain `example.com` the variables are `SSH_USERNAME_EXAMPLE_COM`
/// and `SSH_PASSWORD_EXAMPLE_COM`; both must be set and non-empty.
#[derive(Default)]
pub struct EnvironmentProvider;

impl EnvironmentProvider {
    /// Create a new environment lookup provider.
    pub fn new() -> Self {
        Self
    }

    /// Variable names for a domain: upper-cased, `.` replaced with `_`.
    pub(crate) fn variable_names(domain: &str) -> (String, String) {
        let suffix = domain.to_uppercase().replace('.', "_");
        (
            format!("SSH_USERNAME_{}", suffix),
            format!("SSH_PASSWORD_{}", suffix),
        )
    }

    fn non_empty_var(name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.is_empty())
    }
}

#[async_trait]
impl CredentialProvider for EnvironmentProvider {
    async fn resolve(&self, domain: &str) -> Option<Credential> {
        let (username_var, password_var) = Self::variable_names(domain);

        let username = Self::non_empty_var(&username_var)?;
        let Some(password) = Self::non_empty_var(&password_var) else {
            debug!("{} is set but {} is missing or empty", username_var, password_var);
            return None;
        };

        Some(Credential::new(username, password))
    }

    async fn store(&self, _domain: &str, _credential: &Credential) -> bool {
        // Environment variables are a read-only source
        false
    }

    fn name(&self) -> &'static str {
        "environment"
    }

    fn durable(&self) -> bool {
        false
    }
}
