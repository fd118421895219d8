//! Outbound HTTP client.
//!
//! One pooled client is built at startup and cloned into every handler. It
//! serves both the primary forward and mirror dispatch.

use axum::body::Body;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

/// Shared, connection-pooling client for http and https upstreams.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Build the shared client.
pub fn build_client() -> Result<HttpClient, rustls::Error> {
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
        .https_or_http()
        .enable_http1()
        .build();

    Ok(Client::builder(TokioExecutor::new()).build(connector))
}
