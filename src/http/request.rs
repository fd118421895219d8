//! Request identity.
//!
//! # Responsibilities
//! - Pick up the client's `x-request-id`, or generate a UUID v4 one
//! - Expose the ID for structured logs
//!
//! # Design Decisions
//! - The ID lives only in log fields; request and response headers are never touched

use std::fmt;

use axum::http::{HeaderMap, HeaderName};
use uuid::Uuid;

/// Header the client may use to supply its own request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Identifier used to correlate the log lines of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// The inbound `x-request-id`, or a fresh UUID v4.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.to_string()))
            .unwrap_or_else(Self::generate)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
