//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) as early as possible
//! - Build the outbound header map for the origin request
//! - Keep platform-internal headers from leaking to the origin
//!
//! # Design Decisions
//! - The outbound map is a filtered copy, never an alias of the inbound one
//! - `Host` and `Referer` are overwritten; everything else passes through
//! - Hop-by-hop headers are stripped (the outbound client re-frames)
//! - Body is forwarded as an opaque stream, never buffered or parsed

use std::task::{Context, Poll};

use axum::http::{header, HeaderMap, HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Headers whose names start with this prefix are platform-internal routing
/// metadata and must never reach the origin.
pub const PLATFORM_HEADER_PREFIX: &str = "cf-";

/// Connection-scoped headers that must not be forwarded on either hop.
pub(crate) const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Layer that stamps requests with an `x-request-id` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service that assigns a UUID v4 request ID unless the client sent one.
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}

/// True when an inbound header may be forwarded to the origin.
pub fn should_forward(name: &header::HeaderName) -> bool {
    let name = name.as_str();
    !name.starts_with(PLATFORM_HEADER_PREFIX) && !HOP_BY_HOP_HEADERS.contains(&name)
}

/// Build the header map for the outbound origin request.
///
/// Copies every forwardable inbound header (repeats included), then
/// overwrites `Host` with the resolved host and `Referer` with a generic
/// same-origin referer so proxy-internal navigation chains stay private.
pub fn upstream_headers(inbound: &HeaderMap, host: &str, scheme: &str) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len() + 2);
    for (name, value) in inbound {
        if should_forward(name) {
            outbound.append(name.clone(), value.clone());
        }
    }

    if let Ok(value) = HeaderValue::from_str(host) {
        outbound.insert(header::HOST, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{scheme}://{host}/")) {
        outbound.insert(header::REFERER, value);
    }

    outbound
}

/// True when the inbound request carries a body that must be relayed.
pub fn has_request_body(headers: &HeaderMap) -> bool {
    if headers.contains_key(header::TRANSFER_ENCODING) {
        return true;
    }
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .is_some_and(|len| len > 0)
}
