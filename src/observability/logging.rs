//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the default filter from the debug toggle
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` always wins over the built-in default

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directives.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "segment_proxy=debug,tower_http=debug"
    } else {
        "segment_proxy=info,tower_http=info"
    }
}

/// Install the global subscriber.
pub fn init_logging(debug: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        for debug in [true, false] {
            assert!(default_filter(debug).parse::<EnvFilter>().is_ok());
        }
        assert!(default_filter(true).contains("segment_proxy=debug"));
    }
}
