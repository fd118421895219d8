//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file)
//!     → ProxyConfig::apply_env (SEGMENT_MIRROR_HOST_ENV)
//!     → CLI flags (port, debug)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable, passed by reference)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::load_config;
pub use schema::{
    LimitsConfig, ListenerConfig, MirrorConfig, MirrorDispatch, ObservabilityConfig, ProxyConfig,
    UpstreamConfig, MIRROR_HOST_ENV,
};
pub use validation::{validate_config, ValidationError};
