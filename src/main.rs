//! hostgate — transparent host-inferring reverse proxy.
//!
//! The first path segment names the origin host; relative asset requests
//! recover it from the Referer header or the session cookie.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌────────────────────────────────────────────────────┐
//!                  │                     HOSTGATE                        │
//!                  │                                                     │
//!  Client Request  │  ┌─────────┐   ┌──────────┐   ┌────────────────┐   │
//!  ────────────────┼─▶│  http   │──▶│ resolve  │──▶│ http::request  │   │
//!                  │  │ server  │   │  chain   │   │  (transform)   │   │
//!                  │  └─────────┘   └──────────┘   └───────┬────────┘   │
//!                  │                                        ▼            │
//!  Client Response │  ┌────────────────┐          ┌────────────────┐    │
//!  ◀───────────────┼──│ http::response │◀─────────│    upstream    │◀───┼── Origin
//!                  │  │  (sanitize)    │          │   dispatcher   │    │   (HTTPS)
//!                  │  └────────────────┘          └────────────────┘    │
//!                  │                                                     │
//!                  │  config · lifecycle · observability (cross-cutting) │
//!                  └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hostgate::config::{load_config, ProxyConfig};
use hostgate::http::HttpServer;
use hostgate::lifecycle::{signals, Shutdown};
use hostgate::observability::metrics;

#[derive(Parser)]
#[command(name = "hostgate")]
#[command(about = "Transparent host-inferring reverse proxy", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address from the config file.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("hostgate v0.1.0 starting");

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_scheme = config.upstream.scheme.as_str(),
        redirect = ?config.upstream.redirect,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    // Initialize metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Translate OS signals into the shutdown broadcast
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    // Create and run HTTP server
    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
