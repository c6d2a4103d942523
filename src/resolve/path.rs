//! Request path decomposition.
//!
//! # Responsibilities
//! - Split the raw path into non-empty segments
//! - Capture the query string verbatim (leading `?` included)
//! - Signal root requests (no segments) so they can be delegated
//!
//! # Design Decisions
//! - Segments are kept percent-encoded; the origin sees the same bytes
//! - An empty segment list is a valid state, not a failure

use axum::http::Uri;

/// The decomposed path of an incoming request.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestPath<'a> {
    /// Non-empty path segments, in order.
    pub segments: Vec<&'a str>,

    /// Query string exactly as received, including the leading `?`.
    /// Empty when the request carried none.
    pub query: &'a str,
}

impl<'a> RequestPath<'a> {
    /// Decompose a request URI.
    pub fn parse(uri: &'a Uri) -> Self {
        let segments = uri
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        // `Uri::query()` drops the `?`; slice the raw path-and-query instead
        // so the origin URL reproduces the query byte-for-byte.
        let query = uri
            .path_and_query()
            .and_then(|pq| pq.as_str().find('?').map(|i| &pq.as_str()[i..]))
            .unwrap_or("");

        Self { segments, query }
    }

    /// True when the path carries no segments (the root request).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The full path re-joined with `/`, without a leading slash.
    ///
    /// This is the resource path for asset requests resolved via Referer or
    /// cookie, where the whole incoming path belongs to the origin.
    pub fn joined(&self) -> String {
        self.segments.join("/")
    }
}
