//! Host resolution strategies.
//!
//! # Responsibilities
//! - Recover the origin host from the explicit first path segment
//! - Fall back to the Referer URL for relative asset requests
//! - Fall back to the session cookie when the Referer is stripped
//!
//! # Design Decisions
//! - Each tier is a pure function over the request context
//! - Tiers are tried in a fixed order; the first hit wins
//! - A segment counts as a host only if it contains a dot and stays
//!   within hostname characters (rules out schemes, ports, slashes)
//! - Malformed Referer/Cookie values are treated as absent

use std::fmt;

use axum::http::{header, HeaderMap};
use url::Url;

use crate::resolve::cookie::cookie_value;
use crate::resolve::path::RequestPath;

/// Everything a resolution tier may inspect.
#[derive(Debug)]
pub struct RequestContext<'a> {
    /// Decomposed request path.
    pub path: &'a RequestPath<'a>,

    /// Raw inbound headers.
    pub headers: &'a HeaderMap,
}

/// A resolved origin target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Bare hostname. Never carries a scheme, port, or slashes.
    pub host: String,

    /// Path on the origin, without a leading slash. May be empty.
    pub resource_path: String,

    /// True when the host came from the explicit path segment.
    /// Primary requests are the ones that establish the session cookie.
    pub primary: bool,
}

/// A successful resolution, tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target: ResolvedTarget,
    pub tier: &'static str,
}

/// No tier produced a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unable to resolve an upstream host from the path, Referer, or session cookie")]
pub struct ResolveError;

/// A single resolution tier.
pub trait ResolveStrategy: Send + Sync + fmt::Debug {
    /// Short tier name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Attempt to resolve a target. `None` falls through to the next tier.
    fn resolve(&self, ctx: &RequestContext<'_>) -> Option<ResolvedTarget>;
}

/// True when a path segment can stand in for a hostname.
fn is_host_candidate(segment: &str) -> bool {
    segment.contains('.')
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Tier 1: the first path segment names the host explicitly.
///
/// `/google.com/search` → host `google.com`, resource path `search`.
#[derive(Debug, Clone, Copy)]
pub struct PathSegmentStrategy;

impl ResolveStrategy for PathSegmentStrategy {
    fn name(&self) -> &'static str {
        "path"
    }

    fn resolve(&self, ctx: &RequestContext<'_>) -> Option<ResolvedTarget> {
        let first = ctx.path.segments.first()?;
        if !is_host_candidate(first) {
            return None;
        }
        Some(ResolvedTarget {
            host: (*first).to_string(),
            resource_path: ctx.path.segments[1..].join("/"),
            primary: true,
        })
    }
}

/// Tier 2: infer the host from the Referer URL.
///
/// Browsers request assets relative to the page that referenced them, so the
/// page's proxied URL (which carries the origin host in its first segment)
/// shows up here as `https://{proxy}/{host}/...`. The incoming path is kept
/// whole: it already is the path the origin expects.
#[derive(Debug, Clone, Copy)]
pub struct RefererStrategy;

impl ResolveStrategy for RefererStrategy {
    fn name(&self) -> &'static str {
        "referer"
    }

    fn resolve(&self, ctx: &RequestContext<'_>) -> Option<ResolvedTarget> {
        let referer = ctx.headers.get(header::REFERER)?.to_str().ok()?;
        let url = Url::parse(referer).ok()?;
        let host = url
            .path_segments()?
            .find(|segment| is_host_candidate(segment))?
            .to_string();

        Some(ResolvedTarget {
            host,
            resource_path: ctx.path.joined(),
            primary: false,
        })
    }
}

/// Tier 3: the session cookie left behind by the last primary request.
///
/// Covers asset requests where browser privacy policy stripped the Referer.
#[derive(Debug, Clone)]
pub struct CookieStrategy {
    cookie_name: String,
}

impl CookieStrategy {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }
}

impl ResolveStrategy for CookieStrategy {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn resolve(&self, ctx: &RequestContext<'_>) -> Option<ResolvedTarget> {
        let raw = ctx.headers.get(header::COOKIE)?.to_str().ok()?;
        let host = cookie_value(raw, &self.cookie_name)?;
        if !is_host_candidate(host) {
            return None;
        }

        Some(ResolvedTarget {
            host: host.to_string(),
            resource_path: ctx.path.joined(),
            primary: false,
        })
    }
}

/// The ordered fallback chain.
#[derive(Debug)]
pub struct ResolverChain {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl ResolverChain {
    /// Build a chain from explicit tiers, tried in the given order.
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard chain: path segment → Referer → session cookie.
    pub fn standard(cookie_name: impl Into<String>) -> Self {
        Self::new(vec![
            Box::new(PathSegmentStrategy),
            Box::new(RefererStrategy),
            Box::new(CookieStrategy::new(cookie_name)),
        ])
    }

    /// Run the chain. The first tier to produce a target wins.
    pub fn resolve(&self, ctx: &RequestContext<'_>) -> Result<Resolution, ResolveError> {
        for strategy in &self.strategies {
            if let Some(target) = strategy.resolve(ctx) {
                return Ok(Resolution {
                    target,
                    tier: strategy.name(),
                });
            }
        }
        Err(ResolveError)
    }
}
