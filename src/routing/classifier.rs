//! Path classification.
//!
//! Maps an inbound request path to the upstream that should serve it. Only
//! the literal path prefix is inspected; scheme and host never matter.

use std::fmt;

/// Path prefixes served by the CDN.
const CDN_PREFIXES: [&str; 2] = ["/v1/projects", "/analytics.js/v1"];

/// Path prefix of attribution calls on the tracking API.
const ATTRIBUTION_PREFIX: &str = "/v1/attribution";

/// The upstream a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    Cdn,
    TrackingApi,
}

impl Upstream {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::Cdn => "cdn",
            Upstream::TrackingApi => "tracking_api",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a request path. Anything that is not a CDN path, including an
/// empty one, goes to the tracking API.
pub fn classify(path: &str) -> Upstream {
    if CDN_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        Upstream::Cdn
    } else {
        Upstream::TrackingApi
    }
}

/// True for attribution calls. Has no effect on routing.
pub fn is_attribution(path: &str) -> bool {
    path.starts_with(ATTRIBUTION_PREFIX)
}
