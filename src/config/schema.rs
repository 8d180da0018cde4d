//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Upstream origins requests are dispatched to.
    pub origins: OriginsConfig,

    /// Path classification rules.
    pub routing: RoutingConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Durable counter store settings (used when `rate_limit.use_durable_store`).
    pub durable_store: DurableStoreConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
            max_connections: 10_000,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Upstream origin base URLs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginsConfig {
    /// Static export host (pre-built site, shell HTML, assets).
    pub static_origin: String,

    /// Legacy CMS, the default pass-through target.
    pub legacy_origin: String,
}

impl Default for OriginsConfig {
    fn default() -> Self {
        Self {
            static_origin: "http://127.0.0.1:3000".to_string(),
            legacy_origin: "http://127.0.0.1:3001".to_string(),
        }
    }
}

/// Path classification rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Catch-all section root, without trailing slash (e.g. "/public/pats").
    pub section_root: String,

    /// Static HTML file served for every item under the section root.
    pub shell_html_path: String,

    /// Root-level files fetched from the static origin as-is.
    pub root_files: Vec<String>,

    /// Build framework asset prefixes.
    pub framework_prefixes: Vec<String>,

    /// Static asset prefixes.
    pub static_prefixes: Vec<String>,

    /// Path suffix always treated as a static asset.
    pub text_suffix: String,

    /// Query parameter marking framework-internal requests.
    pub internal_query_marker: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            section_root: "/public/pats".to_string(),
            shell_html_path: "/public/pats/index.html".to_string(),
            root_files: vec![
                "/ads.txt".to_string(),
                "/favicon.ico".to_string(),
                "/robots.txt".to_string(),
                "/sitemap.xml".to_string(),
            ],
            framework_prefixes: vec!["/_next/".to_string()],
            static_prefixes: vec![
                "/static/".to_string(),
                "/styles/".to_string(),
                "/images/".to_string(),
            ],
            text_suffix: ".txt".to_string(),
            internal_query_marker: "_rsc".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per client, path scope and window.
    pub max_requests: u64,

    /// Fixed window length in seconds.
    pub window_secs: u64,

    /// Path prefixes subject to limiting. Empty means every path.
    pub path_prefixes: Vec<String>,

    /// Use the durable key-value store instead of the local map.
    pub use_durable_store: bool,

    /// Extra seconds added to the window when setting the counter TTL.
    pub ttl_grace_secs: u64,

    /// Trusted edge-injected client IP header.
    pub client_ip_header: String,

    /// Forwarded-for style header, first entry is used.
    pub forwarded_header: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 60,
            path_prefixes: vec!["/public/pats".to_string()],
            use_durable_store: false,
            ttl_grace_secs: 60,
            client_ip_header: "cf-connecting-ip".to_string(),
            forwarded_header: "x-forwarded-for".to_string(),
        }
    }
}

/// Durable key-value store endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DurableStoreConfig {
    /// Base URL of the REST key-value namespace.
    pub url: Option<String>,

    /// Bearer token for the store API.
    pub api_token: Option<String>,

    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DurableStoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_token: None,
            timeout_ms: 1000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds. Unset leaves the runtime default.
    pub request_secs: Option<u64>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
