//! Error types shared across the proxy.
//!
//! Configuration errors are fatal at startup. Proxy errors are converted into
//! gateway-level responses for the caller. Mirror errors never leave the
//! mirror module.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::config::validation::ValidationError;

/// Error raised while loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Failed to parse url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Tls(#[from] rustls::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error raised while handling a proxied request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("invalid upstream uri: {0}")]
    InvalidTarget(#[from] axum::http::Error),
}

impl ProxyError {
    /// Status code returned to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Body(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) | ProxyError::InvalidTarget(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = match &self {
            ProxyError::BodyTooLarge { .. } => "Request body too large",
            ProxyError::Body(_) => "Failed to read request body",
            ProxyError::Upstream(_) | ProxyError::InvalidTarget(_) => "Upstream request failed",
        };
        (self.status(), message).into_response()
    }
}

/// Error raised while mirroring a request. Only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("failed to build mirror request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("mirror transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
}
