//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, concurrency cap)
//! - Run the full proxy pipeline per request:
//!   path → resolver chain → target URL → outbound request → response rewrite
//! - Delegate root requests to the static asset handler
//! - Observability (metrics, correlation IDs)
//!
//! # Design Decisions
//! - All per-request state is task-local; the shared `AppState` is read-only
//! - Bodies stream through in both directions, never buffered
//! - A dropped client connection drops the handler task, which aborts the
//!   in-flight origin request with it

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, Response, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceExt;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{CorsConfig, ProxyConfig, UpstreamScheme};
use crate::http::request::{has_request_body, upstream_headers, RequestIdLayer, X_REQUEST_ID};
use crate::http::response::{apply_cors, sanitize_headers, session_cookie};
use crate::observability::metrics;
use crate::resolve::{build_target_url, RequestContext, RequestPath, ResolverChain};
use crate::upstream::Dispatcher;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResolverChain>,
    pub dispatcher: Dispatcher,
    pub cors: CorsConfig,
    pub cookie_name: String,
    pub scheme: UpstreamScheme,
    pub port: Option<u16>,
    pub assets: ServeDir,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let dispatcher = Dispatcher::from_config(&config.upstream, &config.timeouts)?;

        let state = AppState {
            resolver: Arc::new(ResolverChain::standard(config.session.cookie_name.clone())),
            dispatcher,
            cors: config.cors.clone(),
            cookie_name: config.session.cookie_name.clone(),
            scheme: config.upstream.scheme,
            port: config.upstream.port,
            assets: ServeDir::new(&config.static_assets.dir),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
            .layer(ConcurrencyLimitLayer::new(config.listener.max_connections))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Resolves the origin host, forwards the request, and rewrites the response.
async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> axum::response::Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let method_str = method.to_string();

    let (parts, body) = request.into_parts();
    let path = RequestPath::parse(&parts.uri);

    if path.is_root() {
        tracing::debug!(request_id = %request_id, "root request, delegating to static assets");
        let response = serve_static(state.assets.clone(), Request::from_parts(parts, body)).await;
        metrics::record_request(&method_str, response.status().as_u16(), "static", start);
        return response;
    }

    let ctx = RequestContext {
        path: &path,
        headers: &parts.headers,
    };
    let resolution = match state.resolver.resolve(&ctx) {
        Ok(resolution) => resolution,
        Err(err) => {
            tracing::warn!(
                request_id = %request_id,
                path = %parts.uri.path(),
                "host resolution failed"
            );
            metrics::record_request(&method_str, StatusCode::BAD_REQUEST.as_u16(), "none", start);
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    let target = resolution.target;
    let scheme = state.scheme.as_str();
    let url = build_target_url(
        scheme,
        &target.host,
        state.port,
        &target.resource_path,
        path.query,
    );
    let outbound_headers = upstream_headers(&parts.headers, &target.host, scheme);
    let outbound_body = if has_request_body(&parts.headers) {
        Some(reqwest::Body::wrap_stream(body.into_data_stream()))
    } else {
        None
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        url = %url,
        tier = resolution.tier,
        primary = target.primary,
        "forwarding to origin"
    );

    match state
        .dispatcher
        .dispatch(method, &url, outbound_headers, outbound_body)
        .await
    {
        Ok(origin) => {
            let status = origin.status();
            metrics::record_request(&method_str, status.as_u16(), resolution.tier, start);

            let mut headers = sanitize_headers(origin.headers());
            apply_cors(&mut headers, &state.cors);
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                headers.insert(X_REQUEST_ID, value);
            }
            if target.primary {
                if let Some(cookie) = session_cookie(&state.cookie_name, &target.host) {
                    headers.append(header::SET_COOKIE, cookie);
                }
            }

            let mut response = Response::new(Body::from_stream(origin.bytes_stream()));
            *response.status_mut() = status;
            *response.headers_mut() = headers;
            response
        }
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                url = %url,
                error = %err,
                "origin request failed"
            );
            metrics::record_request(&method_str, err.status().as_u16(), resolution.tier, start);
            (err.status(), err.to_string()).into_response()
        }
    }
}

/// Hand a root request to the static asset service.
async fn serve_static(assets: ServeDir, request: Request<Body>) -> axum::response::Response {
    match assets.oneshot(request).await {
        Ok(response) => response.map(Body::new).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
