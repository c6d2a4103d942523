//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parseable)
//! - Check the session cookie name is a valid cookie token
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{ProxyConfig, RedirectPolicy};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("upstream.max_redirects must be greater than zero when redirect = \"follow\"")]
    ZeroMaxRedirects,

    #[error("upstream.port must not be zero")]
    ZeroUpstreamPort,

    #[error("session.cookie_name must not be empty")]
    EmptyCookieName,

    #[error("session.cookie_name {0:?} contains characters not allowed in a cookie name")]
    InvalidCookieName(String),

    #[error("cors.allow_methods must not be empty")]
    NoCorsMethods,

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for (name, value) in [
        ("connect_secs", config.timeouts.connect_secs),
        ("upstream_secs", config.timeouts.upstream_secs),
        ("request_secs", config.timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.upstream.redirect == RedirectPolicy::Follow && config.upstream.max_redirects == 0 {
        errors.push(ValidationError::ZeroMaxRedirects);
    }

    if config.upstream.port == Some(0) {
        errors.push(ValidationError::ZeroUpstreamPort);
    }

    let cookie_name = &config.session.cookie_name;
    if cookie_name.is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    } else if !cookie_name.chars().all(is_cookie_token_char) {
        errors.push(ValidationError::InvalidCookieName(cookie_name.clone()));
    }

    if config.cors.allow_methods.is_empty() {
        errors.push(ValidationError::NoCorsMethods);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// RFC 6265 cookie-name token characters.
fn is_cookie_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~')
}
