//! Hostname to credential-scoping domain resolution.

/// Derive the credential-scoping domain for a hostname.
///
/// Splits on `.` and keeps the last two labels; hostnames with fewer than
/// two labels are returned unchanged. Two hostnames sharing a domain share
/// credentials, so every read, write, and probe must go through this one
/// function.
///
/// ```
/// use ssh_keychain_mcp::mcp::credentials::domain_from_hostname;
///
/// assert_eq!(domain_from_hostname("web01.prod.example.com"), "example.com");
/// assert_eq!(domain_from_hostname("localhost"), "localhost");
/// ```
pub fn domain_from_hostname(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() >= 2 {
        labels[labels.len() - 2..].join(".")
    } else {
        hostname.to_string()
    }
}
