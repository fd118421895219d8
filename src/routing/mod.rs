//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → classifier.rs (CDN or tracking API, attribution flag)
//!     → target.rs (look up the fixed RouteTarget)
//!     → rewrite.rs (join paths, merge queries, build absolute URI)
//!     → director.rs (apply to request parts, set Host)
//! ```
//!
//! # Design Decisions
//! - Targets resolved at startup, immutable at runtime
//! - Literal prefix matching only, no regex
//! - Deterministic: same path always routes to the same upstream

pub mod classifier;
pub mod director;
pub mod rewrite;
pub mod target;

pub use classifier::{classify, is_attribution, Upstream};
pub use director::{Decision, Director};
pub use target::{RouteTarget, Upstreams};
