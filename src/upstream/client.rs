//! Origin request dispatch.
//!
//! # Responsibilities
//! - Build the outbound HTTP client (TLS, redirect policy, timeouts)
//! - Issue origin requests and classify transport failures
//!
//! # Design Decisions
//! - This is the single suspension point of the pipeline
//! - No automatic retries; a failure maps to exactly one gateway error
//! - Timeouts are always finite: an unresponsive origin must not hang a task

use std::time::Duration;

use axum::http::{HeaderMap, Method, StatusCode};
use reqwest::redirect::Policy;

use crate::config::schema::{RedirectPolicy, TimeoutConfig, UpstreamConfig};

/// Transport-level failure talking to the origin.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("failed to connect to upstream")]
    Connect(#[source] reqwest::Error),

    #[error("upstream transport error")]
    Transport(#[source] reqwest::Error),
}

impl UpstreamError {
    fn classify(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err)
        } else if err.is_connect() {
            UpstreamError::Connect(err)
        } else {
            UpstreamError::Transport(err)
        }
    }

    /// Gateway status reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            UpstreamError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            UpstreamError::Connect(_) | UpstreamError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Issues outbound requests to resolved origins.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    /// Build the dispatcher from configuration.
    pub fn from_config(
        upstream: &UpstreamConfig,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, reqwest::Error> {
        let redirect = match upstream.redirect {
            RedirectPolicy::Follow => Policy::limited(upstream.max_redirects),
            RedirectPolicy::Manual => Policy::none(),
        };

        let client = reqwest::Client::builder()
            .redirect(redirect)
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .build()?;

        Ok(Self { client })
    }

    /// Forward a request to the origin and wait for its response headers.
    ///
    /// The response body has not been read when this returns; callers stream
    /// it onward chunk by chunk.
    pub async fn dispatch(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<reqwest::Body>,
    ) -> Result<reqwest::Response, UpstreamError> {
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        request.send().await.map_err(UpstreamError::classify)
    }
}
