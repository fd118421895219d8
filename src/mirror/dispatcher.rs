//! Best-effort mirror dispatch.
//!
//! # Design Decisions
//! - `dispatch` returns a `MirrorOutcome`, never an error
//! - The mirror response body is dropped unread
//! - No timeout or retry; a hung mirror stalls an inline dispatch

use axum::body::Body;
use axum::http::header::HOST;
use axum::http::{Request, StatusCode};

use crate::config::{MirrorDispatch, ProxyConfig};
use crate::error::{ConfigError, MirrorError};
use crate::http::client::HttpClient;
use crate::mirror::request::{MirrorRequest, MirrorTarget};
use crate::observability::metrics;

/// Result of one mirror attempt. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The mirror answered with a 2xx status.
    Delivered(StatusCode),
    /// The mirror answered with a non-2xx status.
    Rejected(StatusCode),
    /// The request could not be built or sent.
    Failed,
}

impl MirrorOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            MirrorOutcome::Delivered(_) => "delivered",
            MirrorOutcome::Rejected(_) => "rejected",
            MirrorOutcome::Failed => "failed",
        }
    }
}

/// Sends copies of inbound requests to the mirror target.
#[derive(Clone)]
pub struct Mirror {
    target: MirrorTarget,
    client: HttpClient,
    mode: MirrorDispatch,
}

impl Mirror {
    pub fn new(target: MirrorTarget, client: HttpClient, mode: MirrorDispatch) -> Self {
        Self {
            target,
            client,
            mode,
        }
    }

    /// Build the mirror if one is configured.
    pub fn from_config(
        config: &ProxyConfig,
        client: &HttpClient,
    ) -> Result<Option<Self>, ConfigError> {
        config
            .upstreams
            .mirror_url
            .as_deref()
            .map(|raw| {
                MirrorTarget::parse(raw)
                    .map(|target| Self::new(target, client.clone(), config.mirror.dispatch))
            })
            .transpose()
    }

    pub fn target(&self) -> &MirrorTarget {
        &self.target
    }

    pub fn mode(&self) -> MirrorDispatch {
        self.mode
    }

    /// Dispatch according to the configured mode.
    pub async fn submit(&self, request: MirrorRequest) {
        match self.mode {
            MirrorDispatch::Inline => {
                self.dispatch(request).await;
            }
            MirrorDispatch::Detached => {
                let mirror = self.clone();
                tokio::spawn(async move {
                    mirror.dispatch(request).await;
                });
            }
        }
    }

    /// Send one copy and wait for the mirror's status.
    pub async fn dispatch(&self, request: MirrorRequest) -> MirrorOutcome {
        let destination = self.target.destination(&request.request_uri);

        let outcome = match self.send(&destination, request).await {
            Ok(status) if status.is_success() => {
                tracing::debug!(mirror_url = %destination, status = %status, "Mirrored request");
                MirrorOutcome::Delivered(status)
            }
            Ok(status) => {
                tracing::warn!(
                    mirror_url = %destination,
                    status = %status,
                    "Mirror rejected request"
                );
                MirrorOutcome::Rejected(status)
            }
            Err(e) => {
                tracing::error!(
                    mirror_url = %self.target.as_str(),
                    error = %e,
                    "Failed to mirror request"
                );
                MirrorOutcome::Failed
            }
        };

        metrics::record_mirror(outcome.label());
        outcome
    }

    async fn send(
        &self,
        destination: &str,
        request: MirrorRequest,
    ) -> Result<StatusCode, MirrorError> {
        let mut builder = Request::builder().method(request.method).uri(destination);

        if let Some(headers) = builder.headers_mut() {
            // The client fills in the mirror's own Host
            for (name, value) in request.headers.iter().filter(|(name, _)| **name != HOST) {
                headers.append(name.clone(), value.clone());
            }
        }

        let req = builder.body(Body::from(request.body))?;
        let response = self.client.request(req).await?;
        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::build_client;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(MirrorOutcome::Delivered(StatusCode::OK).label(), "delivered");
        assert_eq!(MirrorOutcome::Rejected(StatusCode::BAD_GATEWAY).label(), "rejected");
        assert_eq!(MirrorOutcome::Failed.label(), "failed");
    }

    #[tokio::test]
    async fn test_from_config_without_mirror() {
        let client = build_client().unwrap();
        let mirror = Mirror::from_config(&ProxyConfig::default(), &client).unwrap();
        assert!(mirror.is_none());
    }

    #[tokio::test]
    async fn test_from_config_with_mirror() {
        let client = build_client().unwrap();
        let mut config = ProxyConfig::default();
        config.upstreams.mirror_url = Some("http://mirror.example.com/".into());
        config.mirror.dispatch = MirrorDispatch::Detached;

        let mirror = Mirror::from_config(&config, &client).unwrap().unwrap();
        assert_eq!(mirror.target().as_str(), "http://mirror.example.com");
        assert_eq!(mirror.mode(), MirrorDispatch::Detached);
    }

    #[tokio::test]
    async fn test_unreachable_mirror_is_swallowed() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mirror = Mirror::new(
            MirrorTarget::parse(&format!("http://{}", addr)).unwrap(),
            build_client().unwrap(),
            MirrorDispatch::Inline,
        );
        let request = MirrorRequest {
            method: axum::http::Method::POST,
            request_uri: "/v1/track".into(),
            headers: Default::default(),
            body: axum::body::Bytes::from_static(b"{}"),
        };

        assert_eq!(mirror.dispatch(request).await, MirrorOutcome::Failed);
    }
}
