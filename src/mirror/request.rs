//! Mirror target and the request snapshot sent to it.

use axum::body::Bytes;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method};

use crate::error::ConfigError;
use crate::routing::target::parse_base_url;

/// The observer host receiving copies of every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorTarget {
    base: String,
}

impl MirrorTarget {
    /// Validate the configured URL and keep its normalized form, so the
    /// host is already punycode-encoded when the request is built.
    /// Trailing slashes are dropped so the request URI can be appended directly.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = parse_base_url(raw)?;
        Ok(Self {
            base: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Base URL followed by the original request URI.
    pub fn destination(&self, request_uri: &str) -> String {
        format!("{}{}", self.base, request_uri)
    }
}

/// Copy of an inbound request taken before the director touches it.
#[derive(Debug, Clone)]
pub struct MirrorRequest {
    pub method: Method,
    /// Path and query exactly as received.
    pub request_uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl MirrorRequest {
    pub fn snapshot(parts: &Parts, body: Bytes) -> Self {
        let request_uri = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        Self {
            method: parts.method.clone(),
            request_uri,
            headers: parts.headers.clone(),
            body,
        }
    }
}
