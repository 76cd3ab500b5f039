//! Error classification for SSH connection retry logic.
//!
//! Connect errors fall into three categories:
//!
//! 1. **Authentication failures (NOT retryable)**: credential or permission
//!    issues that will not resolve by retrying. Retrying these risks account
//!    lockouts.
//! 2. **Connection errors (retryable)**: transient network issues that may
//!    resolve on retry.
//! 3. **Unknown errors**: retried unless the message looks like an SSH
//!    protocol error (contains "ssh" without a timeout/connect keyword).
//!
//! Authentication patterns take precedence: an error matching both an auth
//! and a connection pattern is classified as non-retryable.

/// Authentication error patterns that indicate permanent failures.
const AUTH_ERRORS: &[&str] = &[
    "authentication failed",
    "password authentication failed",
    "permission denied",
    "publickey",
    "auth fail",
    "no authentication",
    "all authentication methods failed",
];

/// Connection error patterns that indicate transient failures.
const RETRYABLE_ERRORS: &[&str] = &[
    "connection refused",
    "connection reset",
    "connection timed out",
    "timeout",
    "network is unreachable",
    "no route to host",
    "host is down",
    "temporary failure",
    "resource temporarily unavailable",
    "handshake failed",
    "failed to connect",
    "broken pipe",
    "would block",
];

/// Determines if a connect error is retryable (transient) or permanent.
///
/// Returns `true` if the operation should be retried. Authentication
/// failures are checked first and always win over connection patterns.
pub(crate) fn is_retryable_error(error: &str) -> bool {
    let error_lower = error.to_lowercase();

    if AUTH_ERRORS.iter().any(|p| error_lower.contains(p)) {
        return false;
    }

    if RETRYABLE_ERRORS.iter().any(|p| error_lower.contains(p)) {
        return true;
    }

    // Unknown errors are retried unless they look like SSH protocol errors
    !error_lower.contains("ssh")
        || error_lower.contains("timeout")
        || error_lower.contains("connect")
}
