//! Response handling and transformation.
//!
//! # Responsibilities
//! - Transform the origin response for the client
//! - Strip headers that block embedding (CSP, X-Frame-Options)
//! - Apply the CORS allow headers
//! - Issue the session cookie on primary requests
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Hop-by-hop headers stripped; everything else passes through verbatim
//! - CORS values come from configuration, defaulting to fully permissive

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::CorsConfig;
use crate::http::request::HOP_BY_HOP_HEADERS;

/// Origin headers that would block the proxied content from rendering under
/// the proxy's own origin or inside a frame.
const EMBED_BLOCKING_HEADERS: &[header::HeaderName] = &[
    header::CONTENT_SECURITY_POLICY,
    header::CONTENT_SECURITY_POLICY_REPORT_ONLY,
    header::X_FRAME_OPTIONS,
];

/// Copy origin response headers, dropping hop-by-hop and embed-blocking ones.
pub fn sanitize_headers(origin: &HeaderMap) -> HeaderMap {
    let mut sanitized = HeaderMap::with_capacity(origin.len());
    for (name, value) in origin {
        if HOP_BY_HOP_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if EMBED_BLOCKING_HEADERS.contains(name) {
            continue;
        }
        sanitized.append(name.clone(), value.clone());
    }
    sanitized
}

/// Apply the configured CORS headers, overwriting whatever the origin sent.
pub fn apply_cors(headers: &mut HeaderMap, cors: &CorsConfig) {
    if let Ok(value) = HeaderValue::from_str(&cors.allow_origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    if let Ok(value) = HeaderValue::from_str(&cors.allow_methods.join(", ")) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, value);
    }
    if let Ok(value) = HeaderValue::from_str(&cors.allow_headers.join(", ")) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
    }
}

/// `Set-Cookie` value that remembers the resolved host for follow-up asset
/// requests. Only primary requests write it.
pub fn session_cookie(cookie_name: &str, host: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{cookie_name}={host}; Path=/; SameSite=Lax; Secure"
    ))
    .ok()
}
