//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up the optional access log
//! - Buffer the request body so it can be sent twice
//! - Mirror, direct and forward each request
//! - Stream the upstream response back unmodified

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{Request, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::ProxyConfig;
use crate::error::{ConfigError, ProxyError};
use crate::http::client::{build_client, HttpClient};
use crate::http::headers::{append_forwarded_for, strip_hop_by_hop};
use crate::http::request::RequestId;
use crate::mirror::{Mirror, MirrorRequest};
use crate::observability::metrics;
use crate::routing::Director;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub director: Arc<Director>,
    pub mirror: Option<Mirror>,
    pub client: HttpClient,
    pub max_body_size: usize,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server from a validated configuration.
    pub fn new(config: &ProxyConfig) -> Result<Self, ConfigError> {
        let client = build_client()?;
        let director = Arc::new(Director::from_config(&config.upstreams)?);
        let mirror = Mirror::from_config(config, &client)?;

        match &mirror {
            Some(m) => tracing::info!(
                mirror_url = %m.target().as_str(),
                dispatch = ?m.mode(),
                "Mirroring enabled"
            ),
            None => tracing::debug!("Mirroring disabled"),
        }

        let state = AppState {
            director,
            mirror,
            client,
            max_body_size: config.limits.max_body_size,
        };

        let router = Self::build_router(config, state);
        Ok(Self {
            router,
            config: config.clone(),
        })
    }

    /// Build the Axum router, with the access log when enabled.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state);

        if config.observability.access_log {
            router.layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(LatencyUnit::Millis),
                    ),
            )
        } else {
            router
        }
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
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
/// Buffers the body, mirrors, retargets and forwards the request.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let (mut parts, body) = request.into_parts();
    let request_id = RequestId::from_headers(&parts.headers);

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        "Proxying request"
    );

    let body = match buffer_body(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejecting request");
            return e.into_response();
        }
    };

    // Snapshot before the director mutates anything
    let snapshot = state
        .mirror
        .as_ref()
        .map(|_| MirrorRequest::snapshot(&parts, body.clone()));

    let decision = match state.director.direct(&mut parts) {
        Ok(decision) => decision,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                error = %e,
                "Failed to retarget request"
            );
            return e.into_response();
        }
    };

    if let (Some(mirror), Some(snapshot)) = (&state.mirror, snapshot) {
        mirror.submit(snapshot).await;
    }

    let upstream = decision.upstream;
    match forward(&state.client, parts, body, addr).await {
        Ok(response) => {
            metrics::record_request(upstream, response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                upstream = %upstream,
                error = %e,
                "Upstream error"
            );
            let response = e.into_response();
            metrics::record_request(upstream, response.status().as_u16(), start_time);
            response
        }
    }
}

/// Read the whole body, enforcing the size limit.
async fn buffer_body(body: Body, limit: usize) -> Result<Bytes, ProxyError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(ProxyError::BodyTooLarge { limit }),
        Err(e) => Err(ProxyError::Body(e.to_string())),
    }
}

/// Send the retargeted request and hand back the upstream response.
async fn forward(
    client: &HttpClient,
    mut parts: axum::http::request::Parts,
    body: Bytes,
    client_addr: SocketAddr,
) -> Result<Response, ProxyError> {
    strip_hop_by_hop(&mut parts.headers);
    append_forwarded_for(&mut parts.headers, client_addr.ip());
    parts.version = Version::HTTP_11;

    let request = Request::from_parts(parts, Body::from(body));
    let response: hyper::Response<hyper::body::Incoming> = client.request(request).await?;

    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Ok(Response::from_parts(parts, Body::new(body)))
}
