//! Configuration resolution for the SSH MCP server.
//!
//! This module handles configuration values with a three-tier priority system:
//!
//! 1. **Parameter** - Explicitly provided function parameter (highest priority)
//! 2. **Environment Variable** - Value from environment variable
//! 3. **Default** - Built-in default value (lowest priority)
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SSH_CONNECT_TIMEOUT` | 30s | Connection timeout in seconds |
//! | `SSH_COMMAND_TIMEOUT` | 180s | Command execution timeout in seconds |
//! | `SSH_KEYCHAIN_TIMEOUT` | 30s | Keychain subprocess timeout in seconds |
//! | `SSH_MAX_RETRIES` | 3 | Maximum connect retry attempts |
//! | `SSH_RETRY_DELAY_MS` | 1000ms | Initial retry delay in milliseconds |
//! | `SSH_COMPRESSION` | true | Enable zlib compression |

use std::env;
use std::time::Duration;

/// Default SSH connection timeout in seconds
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default SSH command execution timeout in seconds
pub(crate) const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 180;

/// Default keychain subprocess timeout in seconds.
///
/// Bounds every `security` CLI invocation so a stuck keychain UI
/// (e.g. an unanswered user-presence dialog) cannot hang the server.
pub(crate) const DEFAULT_KEYCHAIN_TIMEOUT_SECS: u64 = 30;

/// Default maximum retry attempts for SSH connection
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default retry delay in milliseconds
pub(crate) const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Maximum retry delay cap (10 seconds)
pub(crate) const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Environment variable name for SSH connection timeout
pub(crate) const CONNECT_TIMEOUT_ENV_VAR: &str = "SSH_CONNECT_TIMEOUT";

/// Environment variable name for SSH command execution timeout
pub(crate) const COMMAND_TIMEOUT_ENV_VAR: &str = "SSH_COMMAND_TIMEOUT";

/// Environment variable name for keychain subprocess timeout
pub(crate) const KEYCHAIN_TIMEOUT_ENV_VAR: &str = "SSH_KEYCHAIN_TIMEOUT";

/// Environment variable name for SSH max retries
pub(crate) const MAX_RETRIES_ENV_VAR: &str = "SSH_MAX_RETRIES";

/// Environment variable name for SSH retry delay in milliseconds
pub(crate) const RETRY_DELAY_MS_ENV_VAR: &str = "SSH_RETRY_DELAY_MS";

/// Environment variable name for SSH compression
pub(crate) const COMPRESSION_ENV_VAR: &str = "SSH_COMPRESSION";

/// Resolve a seconds value with priority: parameter -> env var -> default
fn resolve_secs(param: Option<u64>, env_var: &str, default_secs: u64) -> Duration {
    // Priority 1: Use parameter if provided
    if let Some(secs) = param {
        return Duration::from_secs(secs);
    }

    // Priority 2: Use environment variable if set
    if let Ok(env_value) = env::var(env_var)
        && let Ok(secs) = env_value.parse::<u64>()
    {
        return Duration::from_secs(secs);
    }

    // Priority 3: Default value
    Duration::from_secs(default_secs)
}

/// Resolve the connection timeout with priority: parameter -> env var -> default
pub(crate) fn resolve_connect_timeout(timeout_param: Option<u64>) -> Duration {
    resolve_secs(
        timeout_param,
        CONNECT_TIMEOUT_ENV_VAR,
        DEFAULT_CONNECT_TIMEOUT_SECS,
    )
}

/// Resolve the command execution timeout with priority: parameter -> env var -> default
pub(crate) fn resolve_command_timeout(timeout_param: Option<u64>) -> Duration {
    resolve_secs(
        timeout_param,
        COMMAND_TIMEOUT_ENV_VAR,
        DEFAULT_COMMAND_TIMEOUT_SECS,
    )
}

/// Resolve the keychain subprocess timeout with priority: parameter -> env var -> default
pub(crate) fn resolve_keychain_timeout(timeout_param: Option<u64>) -> Duration {
    resolve_secs(
        timeout_param,
        KEYCHAIN_TIMEOUT_ENV_VAR,
        DEFAULT_KEYCHAIN_TIMEOUT_SECS,
    )
}

/// Resolve the max retries value with priority: parameter -> env var -> default
pub(crate) fn resolve_max_retries(max_retries_param: Option<u32>) -> u32 {
    // Priority 1: Use parameter if provided
    if let Some(max_retries) = max_retries_param {
        return max_retries;
    }

    // Priority 2: Use environment variable if set
    if let Ok(env_retries) = env::var(MAX_RETRIES_ENV_VAR)
        && let Ok(retries) = env_retries.parse::<u32>()
    {
        return retries;
    }

    // Priority 3: Default value
    DEFAULT_MAX_RETRIES
}

/// Resolve the initial retry delay with priority: parameter -> env var -> default
pub(crate) fn resolve_retry_delay(retry_delay_param: Option<u64>) -> Duration {
    // Priority 1: Use parameter if provided
    if let Some(delay_ms) = retry_delay_param {
        return Duration::from_millis(delay_ms);
    }

    // Priority 2: Use environment variable if set
    if let Ok(env_delay) = env::var(RETRY_DELAY_MS_ENV_VAR)
        && let Ok(delay_ms) = env_delay.parse::<u64>()
    {
        return Duration::from_millis(delay_ms);
    }

    // Priority 3: Default value
    Duration::from_millis(DEFAULT_RETRY_DELAY_MS)
}

/// Resolve the compression setting with priority: parameter -> env var -> default (true)
pub(crate) fn resolve_compression(compress_param: Option<bool>) -> bool {
    // Priority 1: Use parameter if provided
    if let Some(compress) = compress_param {
        return compress;
    }

    // Priority 2: Use environment variable if set
    if let Ok(env_compress) = env::var(COMPRESSION_ENV_VAR) {
        return env_compress.eq_ignore_ascii_case("true") || env_compress == "1";
    }

    // Priority 3: Default value (enabled)
    true
}
