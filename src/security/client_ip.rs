//! Client IP resolution for rate limit keys.

use axum::http::HeaderMap;

/// Shared identifier for clients that carry no usable IP header.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the client IP: trusted edge header first, then the first entry of
/// the forwarded-for header, then [`UNKNOWN_CLIENT`].
pub fn resolve_client_ip(headers: &HeaderMap, ip_header: &str, forwarded_header: &str) -> String {
    let trusted = headers
        .get(ip_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = trusted {
        return ip.to_string();
    }

    headers
        .get(forwarded_header)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
