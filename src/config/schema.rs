//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Environment variable holding the optional mirror host.
pub const MIRROR_HOST_ENV: &str = "SEGMENT_MIRROR_HOST_ENV";

/// Default CDN upstream.
pub const DEFAULT_CDN_URL: &str = "http://cdn.segment.com";

/// Default tracking API upstream.
pub const DEFAULT_TRACKING_API_URL: &str = "http://api.segment.io";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream and mirror URLs.
    pub upstreams: UpstreamConfig,

    /// How mirror copies are dispatched.
    pub mirror: MirrorConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Apply environment overrides using the given lookup.
    ///
    /// An unset or empty mirror variable leaves the configured mirror untouched.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mirror) = lookup(MIRROR_HOST_ENV).filter(|v| !v.is_empty()) {
            self.upstreams.mirror_url = Some(mirror);
        }
    }

    /// Bind on all interfaces at the given port.
    pub fn set_port(&mut self, port: u16) {
        self.listener.bind_address = format!("0.0.0.0:{}", port);
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream targets.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Static asset / CDN host.
    pub cdn_url: String,

    /// Tracking API host.
    pub tracking_api_url: String,

    /// Optional observer host receiving a copy of every request.
    pub mirror_url: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            cdn_url: DEFAULT_CDN_URL.to_string(),
            tracking_api_url: DEFAULT_TRACKING_API_URL.to_string(),
            mirror_url: None,
        }
    }
}

/// Mirror dispatch configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MirrorConfig {
    pub dispatch: MirrorDispatch,
}

/// Whether the mirror copy is awaited before the primary forward.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MirrorDispatch {
    /// Await the mirror call before forwarding the primary request.
    #[default]
    Inline,
    /// Spawn the mirror call and forward immediately.
    Detached,
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered request body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Emit one access log line per request.
    pub access_log: bool,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            access_log: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstreams.cdn_url, "http://cdn.segment.com");
        assert_eq!(config.upstreams.tracking_api_url, "http://api.segment.io");
        assert!(config.upstreams.mirror_url.is_none());
        assert_eq!(config.mirror.dispatch, MirrorDispatch::Inline);
        assert!(!config.observability.access_log);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [upstreams]
            mirror_url = "http://mirror.example.com"

            [mirror]
            dispatch = "detached"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstreams.cdn_url, DEFAULT_CDN_URL);
        assert_eq!(
            config.upstreams.mirror_url.as_deref(),
            Some("http://mirror.example.com")
        );
        assert_eq!(config.mirror.dispatch, MirrorDispatch::Detached);
        assert_eq!(config.listener, ListenerConfig::default());
    }

    #[test]
    fn test_apply_env_sets_mirror() {
        let mut config = ProxyConfig::default();
        config.apply_env(|key| {
            (key == MIRROR_HOST_ENV).then(|| "http://mirror.example.com".to_string())
        });
        assert_eq!(
            config.upstreams.mirror_url.as_deref(),
            Some("http://mirror.example.com")
        );
    }

    #[test]
    fn test_apply_env_ignores_empty_value() {
        let mut config = ProxyConfig::default();
        config.upstreams.mirror_url = Some("http://from-file".into());
        config.apply_env(|_| Some(String::new()));
        assert_eq!(config.upstreams.mirror_url.as_deref(), Some("http://from-file"));

        let mut config = ProxyConfig::default();
        config.apply_env(|_| None);
        assert!(config.upstreams.mirror_url.is_none());
    }

    #[test]
    fn test_set_port() {
        let mut config = ProxyConfig::default();
        config.set_port(9000);
        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
    }
}
