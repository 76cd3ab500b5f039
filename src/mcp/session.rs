//! SSH client handler.
//!
//! Connections are established per tool invocation and torn down after the
//! command completes; there is no session registry.
//!
//! # Thread Safety
//!
//! `client::Handle<AcceptAllHostKeys>` is owned by the executing tool call
//! for its full lifetime, so no shared storage or locking is needed.

use russh::{client, keys};

/// Client handler for russh that accepts all host keys.
///
/// This implementation accepts all server public keys without verification,
/// similar to `StrictHostKeyChecking=no` in OpenSSH configuration.
///
/// # Security Note
///
/// In production environments, you should implement proper host key
/// verification against a known_hosts file to prevent man-in-the-middle
/// attacks.
pub struct AcceptAllHostKeys;

impl client::Handler for AcceptAllHostKeys {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        // Accept all host keys (similar to StrictHostKeyChecking=no)
        Ok(true)
    }
}
