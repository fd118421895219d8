//! Request mirroring subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (body buffered)
//!     → request.rs (snapshot method, original URI, headers, body)
//!     → [director rewrites the primary request]
//!     → dispatcher.rs (send copy to mirror base + original URI)
//!     → MirrorOutcome (logged, counted, discarded)
//! ```
//!
//! # Design Decisions
//! - Snapshot taken before any mutation of the primary request
//! - Own error boundary: nothing here can fail the primary request
//! - Shares the outbound client with the primary forward

pub mod dispatcher;
pub mod request;

pub use dispatcher::{Mirror, MirrorOutcome};
pub use request::{MirrorRequest, MirrorTarget};
