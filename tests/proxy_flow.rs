//! End-to-end tests for the proxy pipeline.

use std::net::SocketAddr;
use std::time::Duration;

use hostgate::config::{ProxyConfig, RedirectPolicy, UpstreamScheme};
use hostgate::lifecycle::Shutdown;
use hostgate::HttpServer;

mod common;
use common::{start_origin, start_unresponsive_origin, OriginResponse};

/// Config pointed at a loopback origin: plain HTTP, port override.
fn proxy_config(origin: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.scheme = UpstreamScheme::Http;
    config.upstream.port = Some(origin.port());
    config.observability.metrics_enabled = false;
    config
}

/// Spawn the proxy on an ephemeral port; returns its address and the
/// shutdown handle keeping it alive.
async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (addr, shutdown)
}

/// Test client that neither follows redirects nor uses a system proxy.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_primary_request_forwards_and_sets_cookie() {
    let origin = start_origin(
        OriginResponse::new("200 OK", "origin says hi").with_header("Content-Type", "text/plain"),
    )
    .await;
    let (proxy, shutdown) = start_proxy(proxy_config(origin.addr)).await;

    let res = client()
        .get(format!("http://{}/127.0.0.1/search?q=workers", proxy))
        .send()
        .await
        .expect("proxy unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("set-cookie").unwrap(),
        "original_host=127.0.0.1; Path=/; SameSite=Lax; Secure"
    );
    assert_eq!(res.headers().get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(
        res.headers().get("access-control-allow-methods").unwrap(),
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(res.text().await.unwrap(), "origin says hi");

    let captured = origin.last_request().expect("origin saw no request");
    assert_eq!(captured.method, "GET");
    assert_eq!(captured.path, "/search?q=workers");
    assert!(captured.header("host").unwrap().starts_with("127.0.0.1"));
    assert_eq!(captured.header("referer").unwrap(), "http://127.0.0.1/");

    shutdown.trigger();
}

#[tokio::test]
async fn test_referer_fallback_resolves_asset_request() {
    let origin = start_origin(OriginResponse::new("200 OK", "body { }")).await;
    let (proxy, shutdown) = start_proxy(proxy_config(origin.addr)).await;

    let res = client()
        .get(format!("http://{}/assets/style.css", proxy))
        .header("referer", format!("http://{}/127.0.0.1/page", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    // Not a primary request: no cookie is issued.
    assert!(res.headers().get("set-cookie").is_none());

    let captured = origin.last_request().unwrap();
    assert_eq!(captured.path, "/assets/style.css");

    shutdown.trigger();
}

#[tokio::test]
async fn test_cookie_fallback_resolves_asset_request() {
    let origin = start_origin(OriginResponse::new("200 OK", "console.log(1)")).await;
    let (proxy, shutdown) = start_proxy(proxy_config(origin.addr)).await;

    let res = client()
        .get(format!("http://{}/deep/nested/app.js", proxy))
        .header("cookie", "theme=dark; original_host=127.0.0.1")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("set-cookie").is_none());
    assert_eq!(origin.last_request().unwrap().path, "/deep/nested/app.js");

    shutdown.trigger();
}

#[tokio::test]
async fn test_resolution_failure_is_400_with_no_outbound_request() {
    let origin = start_origin(OriginResponse::new("200 OK", "never seen")).await;
    let (proxy, shutdown) = start_proxy(proxy_config(origin.addr)).await;

    let res = client()
        .get(format!("http://{}/plain/segments", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body = res.text().await.unwrap();
    assert!(body.contains("unable to resolve"), "body was: {body}");
    assert!(origin.requests().is_empty(), "origin should not be contacted");

    shutdown.trigger();
}

#[tokio::test]
async fn test_embed_blocking_headers_are_stripped() {
    let origin = start_origin(
        OriginResponse::new("200 OK", "<html></html>")
            .with_header("Content-Security-Policy", "default-src 'self'")
            .with_header("X-Frame-Options", "DENY")
            .with_header("X-Origin-Custom", "kept"),
    )
    .await;
    let (proxy, shutdown) = start_proxy(proxy_config(origin.addr)).await;

    let res = client()
        .get(format!("http://{}/127.0.0.1/page", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("content-security-policy").is_none());
    assert!(res.headers().get("x-frame-options").is_none());
    assert_eq!(res.headers().get("x-origin-custom").unwrap(), "kept");

    shutdown.trigger();
}

#[tokio::test]
async fn test_platform_headers_do_not_reach_origin() {
    let origin = start_origin(OriginResponse::new("200 OK", "ok")).await;
    let (proxy, shutdown) = start_proxy(proxy_config(origin.addr)).await;

    client()
        .get(format!("http://{}/127.0.0.1/page", proxy))
        .header("cf-connecting-ip", "203.0.113.9")
        .header("cf-ray", "abc123")
        .header("x-custom-token", "forward-me")
        .send()
        .await
        .unwrap();

    let captured = origin.last_request().unwrap();
    assert!(!captured.has_header("cf-connecting-ip"));
    assert!(!captured.has_header("cf-ray"));
    assert_eq!(captured.header("x-custom-token").unwrap(), "forward-me");

    shutdown.trigger();
}

#[tokio::test]
async fn test_post_body_passes_through() {
    let origin = start_origin(OriginResponse::new("201 Created", "stored")).await;
    let (proxy, shutdown) = start_proxy(proxy_config(origin.addr)).await;

    let res = client()
        .post(format!("http://{}/127.0.0.1/submit", proxy))
        .body("hello upstream")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 201);
    let captured = origin.last_request().unwrap();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.body, "hello upstream");

    shutdown.trigger();
}

#[tokio::test]
async fn test_follow_policy_resolves_redirects_inside_the_proxy() {
    let destination = start_origin(OriginResponse::new("200 OK", "final stop")).await;
    let hop = start_origin(
        OriginResponse::new("302 Found", "")
            .with_header("Location", format!("http://{}/final", destination.addr)),
    )
    .await;
    let (proxy, shutdown) = start_proxy(proxy_config(hop.addr)).await;

    let res = client()
        .get(format!("http://{}/127.0.0.1/start", proxy))
        .send()
        .await
        .unwrap();

    // The client never sees the 302.
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "final stop");
    assert_eq!(destination.last_request().unwrap().path, "/final");

    shutdown.trigger();
}

#[tokio::test]
async fn test_manual_policy_surfaces_redirects_verbatim() {
    let origin = start_origin(
        OriginResponse::new("302 Found", "")
            .with_header("Location", "https://elsewhere.example/x"),
    )
    .await;
    let mut config = proxy_config(origin.addr);
    config.upstream.redirect = RedirectPolicy::Manual;
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .get(format!("http://{}/127.0.0.1/start", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 302);
    assert_eq!(
        res.headers().get("location").unwrap(),
        "https://elsewhere.example/x"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_unresponsive_origin_times_out_as_504() {
    let origin = start_unresponsive_origin().await;
    let mut config = ProxyConfig::default();
    config.upstream.scheme = UpstreamScheme::Http;
    config.upstream.port = Some(origin.port());
    config.observability.metrics_enabled = false;
    config.timeouts.upstream_secs = 1;
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .get(format!("http://{}/127.0.0.1/hang", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 504);

    shutdown.trigger();
}

#[tokio::test]
async fn test_connection_refused_is_502() {
    // Bind and immediately drop a listener to get a port nothing listens on.
    let closed_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut config = ProxyConfig::default();
    config.upstream.scheme = UpstreamScheme::Http;
    config.upstream.port = Some(closed_port);
    config.observability.metrics_enabled = false;
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .get(format!("http://{}/127.0.0.1/page", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);

    shutdown.trigger();
}

#[tokio::test]
async fn test_root_request_serves_static_assets() {
    let static_dir = std::env::temp_dir().join(format!(
        "hostgate-static-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<h1>welcome to hostgate</h1>").unwrap();

    let origin = start_origin(OriginResponse::new("200 OK", "not static")).await;
    let mut config = proxy_config(origin.addr);
    config.static_assets.dir = static_dir.to_string_lossy().into_owned();
    let (proxy, shutdown) = start_proxy(config).await;

    let res = client()
        .get(format!("http://{}/", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(res.text().await.unwrap().contains("welcome to hostgate"));
    assert!(origin.requests().is_empty());

    shutdown.trigger();
    let _ = std::fs::remove_dir_all(&static_dir);
}
