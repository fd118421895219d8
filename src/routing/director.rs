//! Request director.
//!
//! # Responsibilities
//! - Classify the inbound request
//! - Retarget its URI (scheme, authority, path, query) at the chosen upstream
//! - Set the `Host` header to the upstream host
//! - Emit the attribution event
//!
//! # Design Decisions
//! - Built once from validated config, immutable afterwards (shared via Arc)
//! - Operates on request `Parts` only; the body is buffered by the caller
//! - Original scheme/host of the inbound request are always discarded

use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::HeaderValue;

use crate::config::UpstreamConfig;
use crate::error::{ConfigError, ProxyError};
use crate::observability::metrics;
use crate::routing::classifier::{classify, is_attribution, Upstream};
use crate::routing::rewrite::rewrite_uri;
use crate::routing::target::Upstreams;

/// Outcome of directing one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub upstream: Upstream,
    /// The request hit the attribution endpoint of the tracking API.
    pub attribution: bool,
}

#[derive(Debug, Clone)]
pub struct Director {
    upstreams: Upstreams,
}

impl Director {
    pub fn new(upstreams: Upstreams) -> Self {
        Self { upstreams }
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Upstreams::from_config(config)?))
    }

    pub fn upstreams(&self) -> &Upstreams {
        &self.upstreams
    }

    /// Retarget `parts` in place and report where it goes.
    pub fn direct(&self, parts: &mut Parts) -> Result<Decision, ProxyError> {
        let path = parts.uri.path();
        let upstream = classify(path);
        let attribution = upstream == Upstream::TrackingApi && is_attribution(path);

        if attribution {
            let full_path = parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or(path);
            tracing::info!(
                target: "segment_proxy::attribution",
                path = %full_path,
                "Got an attribution request"
            );
            metrics::record_attribution();
        }

        let target = self.upstreams.target_for(upstream);
        parts.uri = rewrite_uri(target, &parts.uri)?;

        let host = HeaderValue::from_str(target.authority()).map_err(axum::http::Error::from)?;
        parts.headers.insert(HOST, host);

        Ok(Decision {
            upstream,
            attribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tracing_test::traced_test;

    use crate::routing::target::RouteTarget;

    const ATTRIBUTION_MESSAGE: &str = "Got an attribution request";

    fn attribution_events<'a>(lines: &[&'a str]) -> Vec<&'a str> {
        lines
            .iter()
            .copied()
            .filter(|line| line.contains(ATTRIBUTION_MESSAGE))
            .collect()
    }

    fn director() -> Director {
        Director::new(Upstreams::new(
            RouteTarget::parse("http://cdn.example.com").unwrap(),
            RouteTarget::parse("https://api.example.com/base/?token=t").unwrap(),
        ))
    }

    fn parts(uri: &str, host: &str) -> Parts {
        let (parts, _) = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Host", host)
            .header("Content-Type", "application/json")
            .body(Body::empty())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_cdn_request_is_retargeted() {
        let mut parts = parts("/v1/projects/abc/settings?x=1", "proxy.local:8080");
        let decision = director().direct(&mut parts).unwrap();

        assert_eq!(decision.upstream, Upstream::Cdn);
        assert!(!decision.attribution);
        assert_eq!(
            parts.uri.to_string(),
            "http://cdn.example.com/v1/projects/abc/settings?x=1"
        );
        assert_eq!(parts.headers[HOST], "cdn.example.com");
    }

    #[test]
    fn test_tracking_request_merges_query_and_base_path() {
        let mut parts = parts("/v1/track?b=2", "proxy.local");
        let decision = director().direct(&mut parts).unwrap();

        assert_eq!(decision.upstream, Upstream::TrackingApi);
        assert_eq!(
            parts.uri.to_string(),
            "https://api.example.com/base/v1/track?token=t&b=2"
        );
        assert_eq!(parts.headers[HOST], "api.example.com");
        // Other headers are left alone
        assert_eq!(parts.headers["content-type"], "application/json");
    }

    #[test]
    fn test_attribution_is_flagged_and_routed_to_tracking_api() {
        let mut parts = parts("/v1/attribution/report", "proxy.local");
        let decision = director().direct(&mut parts).unwrap();

        assert_eq!(
            decision,
            Decision {
                upstream: Upstream::TrackingApi,
                attribution: true,
            }
        );
        assert_eq!(
            parts.uri.to_string(),
            "https://api.example.com/base/v1/attribution/report?token=t"
        );
    }

    #[traced_test]
    #[test]
    fn test_attribution_event_logged_once_with_full_path() {
        let mut parts = parts("/v1/attribution/report?id=7", "proxy.local");
        director().direct(&mut parts).unwrap();

        logs_assert(|lines: &[&str]| match attribution_events(lines).as_slice() {
            [event]
                if event.contains("segment_proxy::attribution")
                    && event.contains("path=/v1/attribution/report?id=7") =>
            {
                Ok(())
            }
            other => Err(format!("expected one attribution event, got {:?}", other)),
        });
    }

    #[traced_test]
    #[test]
    fn test_no_attribution_event_for_other_paths() {
        for uri in ["/v1/track?b=2", "/v1/projects/abc/settings", "/analytics.js/v1/key"] {
            let mut parts = parts(uri, "proxy.local");
            director().direct(&mut parts).unwrap();
        }

        logs_assert(|lines: &[&str]| match attribution_events(lines).as_slice() {
            [] => Ok(()),
            other => Err(format!("unexpected attribution events: {:?}", other)),
        });
    }

    #[test]
    fn test_absolute_form_inbound_uri_loses_original_authority() {
        let mut parts = parts("http://evil.example.com:81/v1/batch", "evil.example.com");
        director().direct(&mut parts).unwrap();

        assert_eq!(parts.uri.authority().unwrap().as_str(), "api.example.com");
        assert_eq!(parts.uri.scheme_str(), Some("https"));
        assert_eq!(parts.headers[HOST], "api.example.com");
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let config = UpstreamConfig {
            cdn_url: "not a url".into(),
            ..UpstreamConfig::default()
        };
        assert!(Director::from_config(&config).is_err());
    }
}
