//! Segment reverse proxy library.
//!
//! Classifies each inbound request as CDN or tracking API traffic, rewrites
//! it onto the chosen upstream and optionally mirrors the original request
//! to an observer host.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod mirror;
pub mod observability;
pub mod routing;

pub use config::ProxyConfig;
pub use error::{ConfigError, MirrorError, ProxyError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
