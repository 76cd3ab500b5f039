//! SSH connection and command execution logic.
//!
//! Each tool invocation establishes its own connection:
//!
//! 1. **Address Parsing**: `host:port` format with default port 22.
//! 2. **Client Configuration**: timeout, keepalive, and compression settings.
//! 3. **Connection + Authentication**: TCP connect with timeout, then
//!    password authentication with the resolved domain credential.
//! 4. **Command Execution**: run the command and collect stdout, stderr,
//!    and exit code. Privileged execution wraps the command in `sudo -S`
//!    and feeds the secret via stdin so it never appears in a process list.
//!
//! # Retry Strategy
//!
//! Connection attempts use exponential backoff with jitter via the `backon`
//! crate. Authentication failures are never retried to avoid account
//! lockouts; see [`crate::mcp::error::is_retryable_error`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use russh::{ChannelMsg, client};
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use crate::mcp::config::MAX_RETRY_DELAY;
use crate::mcp::error::is_retryable_error;
use crate::mcp::session::AcceptAllHostKeys;
use crate::mcp::types::SshCommandResponse;

/// Build russh client configuration with the specified settings.
///
/// The inactivity timeout matches the connect timeout; keepalives run every
/// 30 seconds with a maximum of 3 missed probes before the connection drops.
pub(crate) fn build_client_config(timeout: Duration, compress: bool) -> Arc<client::Config> {
    let compression = if compress {
        (&[russh::compression::ZLIB, russh::compression::NONE][..]).into()
    } else {
        (&[russh::compression::NONE][..]).into()
    };

    let preferred = russh::Preferred {
        compression,
        ..Default::default()
    };

    Arc::new(client::Config {
        inactivity_timeout: Some(timeout),
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        preferred,
        ..Default::default()
    })
}

/// Parse an address string into host and port components.
///
/// Supports `host:port` and bare `host` (default port 22). Uses
/// `rsplit_once` so IPv6 literals like `[::1]:22` keep their brackets.
pub(crate) fn parse_address(address: &str) -> Result<(String, u16), String> {
    if let Some((host, port_str)) = address.rsplit_once(':') {
        let port = port_str
            .parse::<u16>()
            .map_err(|e| format!("Invalid port number: {}", e))?;
        Ok((host.to_string(), port))
    } else {
        Ok((address.to_string(), 22))
    }
}

/// Connect and authenticate with retry for transient failures.
///
/// Returns the authenticated handle and the number of retries needed.
/// Only transient connection errors are retried; authentication failures
/// fail immediately.
pub(crate) async fn connect_with_retry(
    address: &str,
    username: &str,
    secret: &str,
    timeout: Duration,
    max_retries: u32,
    min_delay: Duration,
    compress: bool,
) -> Result<(client::Handle<AcceptAllHostKeys>, u32), String> {
    let attempt_counter = AtomicU32::new(0);

    // Clone values for the retry closure
    let address = address.to_string();
    let username = username.to_string();
    let secret = Zeroizing::new(secret.to_string());

    let backoff = ExponentialBuilder::default()
        .with_min_delay(min_delay)
        .with_max_delay(MAX_RETRY_DELAY)
        .with_max_times(max_retries as usize)
        .with_jitter();

    let result = (|| async {
        let current_attempt = attempt_counter.fetch_add(1, Ordering::SeqCst);

        if current_attempt > 0 {
            warn!(
                "SSH connection retry attempt {} to {}@{}",
                current_attempt, username, address
            );
        }

        connect(&address, &username, secret.as_str(), timeout, compress).await
    })
    .retry(backoff)
    .when(|e| {
        let retryable = is_retryable_error(e);
        if !retryable {
            warn!(
                "SSH connection to {}@{} failed with non-retryable error: {}",
                username, address, e
            );
        }
        retryable
    })
    .notify(|err, dur| {
        warn!("SSH connection failed: {}. Retrying in {:?}", err, dur);
    })
    .await;

    let total_attempts = attempt_counter.load(Ordering::SeqCst);
    let retry_count = total_attempts.saturating_sub(1);

    match result {
        Ok(handle) => {
            if retry_count > 0 {
                info!(
                    "SSH connection to {}@{} succeeded after {} retry attempt(s)",
                    username, address, retry_count
                );
            }
            Ok((handle, retry_count))
        }
        Err(e) => {
            error!(
                "SSH connection to {}@{} failed after {} attempt(s). Last error: {}",
                username, address, total_attempts, e
            );
            Err(format!(
                "SSH connection failed after {} attempt(s). Last error: {}",
                total_attempts, e
            ))
        }
    }
}

/// Establish an SSH connection and authenticate with a password.
async fn connect(
    address: &str,
    username: &str,
    secret: &str,
    timeout: Duration,
    compress: bool,
) -> Result<client::Handle<AcceptAllHostKeys>, String> {
    let config = build_client_config(timeout, compress);
    let handler = AcceptAllHostKeys;

    let (host, port) = parse_address(address)?;

    let connect_future = client::connect(config, (host.as_str(), port), handler);

    let mut handle = tokio::time::timeout(timeout, connect_future)
        .await
        .map_err(|_| format!("Connection timed out after {:?}", timeout))?
        .map_err(|e| format!("Failed to connect: {}", e))?;

    let auth = handle
        .authenticate_password(username, secret)
        .await
        .map_err(|e| format!("Password authentication failed: {}", e))?;

    if !auth.success() {
        return Err("Password authentication failed: credentials rejected".to_string());
    }

    Ok(handle)
}

/// Execute a command on an SSH session with timeout support.
///
/// If the command times out, returns the partial output collected so far
/// with `timed_out: true` instead of an error. The exit code is -1 when the
/// remote side does not provide one.
pub(crate) async fn execute_command(
    handle: &client::Handle<AcceptAllHostKeys>,
    command: &str,
    timeout: Duration,
) -> Result<SshCommandResponse, String> {
    let mut channel = handle
        .channel_open_session()
        .await
        .map_err(|e| format!("Failed to open channel: {}", e))?;

    channel
        .exec(true, command)
        .await
        .map_err(|e| format!("Failed to execute command: {}", e))?;

    Ok(collect_channel_output(&mut channel, timeout).await)
}

/// Execute a command under `sudo` on an SSH session.
///
/// The command is wrapped in `sudo -S` and the secret is written to the
/// channel's stdin, so it is visible neither on the remote command line nor
/// in a process listing. The `[sudo] password for ...` prompt that sudo
/// echoes to stderr is stripped from the response.
pub(crate) async fn execute_sudo_command(
    handle: &client::Handle<AcceptAllHostKeys>,
    command: &str,
    secret: &str,
    timeout: Duration,
) -> Result<SshCommandResponse, String> {
    let mut channel = handle
        .channel_open_session()
        .await
        .map_err(|e| format!("Failed to open channel: {}", e))?;

    let sudo_command = format!("sudo -S {}", command);
    channel
        .exec(true, sudo_command.as_str())
        .await
        .map_err(|e| format!("Failed to execute command: {}", e))?;

    // Feed the secret via stdin; the payload is wiped when it drops.
    let payload = Zeroizing::new(format!("{}\n", secret));
    channel
        .data(payload.as_bytes())
        .await
        .map_err(|e| format!("Failed to write sudo password: {}", e))?;
    channel
        .eof()
        .await
        .map_err(|e| format!("Failed to close stdin: {}", e))?;

    let mut response = collect_channel_output(&mut channel, timeout).await;
    response.stderr = strip_sudo_prompt(&response.stderr);
    Ok(response)
}

/// Read channel messages until close or timeout, collecting output.
async fn collect_channel_output(
    channel: &mut russh::Channel<client::Msg>,
    timeout: Duration,
) -> SshCommandResponse {
    // Pre-allocate buffers to reduce reallocations during output collection
    let mut stdout = Vec::with_capacity(4096);
    let mut stderr = Vec::with_capacity(1024);
    let mut exit_code: Option<u32> = None;
    let mut timed_out = false;

    let result = tokio::time::timeout(timeout, async {
        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    stdout.extend_from_slice(&data);
                }
                Some(ChannelMsg::ExtendedData { data, ext }) => {
                    // ext == 1 is stderr in SSH protocol
                    if ext == 1 {
                        stderr.extend_from_slice(&data);
                    }
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    exit_code = Some(exit_status);
                }
                Some(ChannelMsg::Eof) => {
                    // Continue to wait for exit status if not received yet
                    if exit_code.is_some() {
                        break;
                    }
                }
                Some(ChannelMsg::Close) => {
                    break;
                }
                Some(_) => {
                    // Ignore other message types
                }
                None => {
                    // Channel closed
                    break;
                }
            }
        }
    })
    .await;

    // Timeout returns partial output, not an error
    if result.is_err() {
        timed_out = true;
        warn!(
            "Command timed out after {:?}, returning partial output ({} bytes stdout, {} bytes stderr)",
            timeout,
            stdout.len(),
            stderr.len()
        );
    }

    let _ = channel.close().await;

    SshCommandResponse {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code: exit_code.map(|c| c as i32).unwrap_or(-1),
        timed_out,
    }
}

/// Remove the leading `[sudo] password for ...` prompt line from stderr.
pub(crate) fn strip_sudo_prompt(stderr: &str) -> String {
    if stderr.starts_with("[sudo] password for") {
        match stderr.split_once('\n') {
            Some((_, rest)) => rest.to_string(),
            None => String::new(),
        }
    } else {
        stderr.to_string()
    }
}
