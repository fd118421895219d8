//! Segment reverse proxy.
//!
//! Routes analytics traffic to the CDN or the tracking API and optionally
//! mirrors every request to an observer host.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ http::server ──▶ routing::director ──▶ http::client ──▶ CDN / Tracking API
//!                   │                                                        │
//!                   │ snapshot (original URI + body)                         │
//!                   ▼                                                        │
//!             mirror::dispatcher ──▶ Mirror host (response discarded)        │
//!                                                                            │
//!   Client ◀──────────────────── upstream response, streamed ◀──────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use segment_proxy::config::{load_config, validate_config, ProxyConfig, MIRROR_HOST_ENV};
use segment_proxy::error::ConfigError;
use segment_proxy::http::HttpServer;
use segment_proxy::lifecycle::{wait_for_shutdown, Shutdown};
use segment_proxy::observability::{init_logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "segment-proxy")]
#[command(about = "Reverse proxy for the Segment CDN and tracking API", long_about = None)]
struct Cli {
    /// Port to bind on all interfaces (default 8080).
    #[arg(short, long)]
    port: Option<u16>,

    /// Log every request.
    #[arg(short, long)]
    debug: bool,

    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    tracing::info!("segment-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let config = build_config(&cli).map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;

    if config.upstreams.mirror_url.is_none() {
        tracing::warn!("{} ENV is not set! Mirroring disabled", MIRROR_HOST_ENV);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        cdn_url = %config.upstreams.cdn_url,
        tracking_api_url = %config.upstreams.tracking_api_url,
        access_log = config.observability.access_log,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let server = HttpServer::new(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Serving proxy");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Defaults, then file, then environment, then flags.
fn build_config(cli: &Cli) -> Result<ProxyConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    config.apply_env(|key| std::env::var(key).ok());

    if let Some(port) = cli.port {
        config.set_port(port);
    }
    if cli.debug {
        config.observability.access_log = true;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
