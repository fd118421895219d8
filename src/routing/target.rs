//! Route targets.
//!
//! # Responsibilities
//! - Parse configured upstream URLs once at startup
//! - Hold the immutable (scheme, authority, base path, query) of each upstream
//! - Look up the target for a classified request

use url::Url;

use crate::config::UpstreamConfig;
use crate::error::ConfigError;
use crate::routing::classifier::Upstream;

/// Parse an absolute http(s) URL with a host.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// One upstream destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    scheme: String,
    authority: String,
    base_path: String,
    query: String,
}

impl RouteTarget {
    /// Parse a target from its configured URL.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = parse_base_url(raw)?;
        Ok(Self::from_url(&url))
    }

    fn from_url(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default();
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        // The url crate normalizes an empty path to "/". Both join identically.
        let base_path = match url.path() {
            "/" => String::new(),
            path => path.to_string(),
        };

        Self {
            scheme: url.scheme().to_string(),
            authority,
            base_path,
            query: url.query().unwrap_or_default().to_string(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host with an explicit port, if one was configured.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Fixed query string, without the leading `?`.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// The two fixed upstream targets of the process.
#[derive(Debug, Clone)]
pub struct Upstreams {
    cdn: RouteTarget,
    tracking_api: RouteTarget,
}

impl Upstreams {
    pub fn new(cdn: RouteTarget, tracking_api: RouteTarget) -> Self {
        Self { cdn, tracking_api }
    }

    /// Resolve the configured upstream URLs.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            RouteTarget::parse(&config.cdn_url)?,
            RouteTarget::parse(&config.tracking_api_url)?,
        ))
    }

    pub fn target_for(&self, upstream: Upstream) -> &RouteTarget {
        match upstream {
            Upstream::Cdn => &self.cdn,
            Upstream::TrackingApi => &self.tracking_api,
        }
    }
}
