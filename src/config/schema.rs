//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Outbound (origin-facing) behaviour.
    pub upstream: UpstreamConfig,

    /// Session cookie settings.
    pub session: SessionConfig,

    /// CORS headers applied to every proxied response.
    pub cors: CorsConfig,

    /// Static assets served for the root path.
    pub static_assets: StaticAssetsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout for origin requests, in seconds.
    pub connect_secs: u64,

    /// Total time allowed for a single origin request/response, in seconds.
    pub upstream_secs: u64,

    /// Inbound request timeout (covers the whole proxied exchange), in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}

/// How the proxy reacts to origin redirects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectPolicy {
    /// Resolve redirects inside the proxy. The client never sees the origin's
    /// `Location` header, which keeps the path-rewriting abstraction intact.
    Follow,

    /// Surface 3xx responses verbatim. The `Location` header will expose the
    /// origin's true scheme and host to the client.
    Manual,
}

/// Scheme used for origin requests.
///
/// `https` is the contract; `http` exists so local development and the
/// integration suite can drive the full pipeline against a loopback origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamScheme {
    Https,
    Http,
}

impl UpstreamScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamScheme::Https => "https",
            UpstreamScheme::Http => "http",
        }
    }
}

/// Outbound request configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Redirect handling policy.
    pub redirect: RedirectPolicy,

    /// Maximum redirect hops when `redirect = "follow"`.
    pub max_redirects: usize,

    /// Scheme for origin requests.
    pub scheme: UpstreamScheme,

    /// Port override for origin requests. `None` uses the scheme default.
    /// Intended for local development against non-standard origins.
    pub port: Option<u16>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            redirect: RedirectPolicy::Follow,
            max_redirects: 10,
            scheme: UpstreamScheme::Https,
            port: None,
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie that remembers the last explicitly requested host.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "original_host".to_string(),
        }
    }
}

/// CORS headers applied to every proxied response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value for `Access-Control-Allow-Origin`.
    pub allow_origin: String,

    /// Values for `Access-Control-Allow-Methods`, joined with ", ".
    pub allow_methods: Vec<String>,

    /// Values for `Access-Control-Allow-Headers`, joined with ", ".
    pub allow_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allow_headers: vec!["*".to_string()],
        }
    }
}

/// Static asset serving for the root path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticAssetsConfig {
    /// Directory served when the request path carries no segments.
    pub dir: String,
}

impl Default for StaticAssetsConfig {
    fn default() -> Self {
        Self {
            dir: "public".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
