//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, access log)
//!     → server.rs handler (buffer body)
//!     → [mirror snapshot + director rewrite]
//!     → headers.rs (hop-by-hop, X-Forwarded-For)
//!     → client.rs (shared pooled client)
//!     → upstream response streamed back to the caller
//! ```

pub mod client;
pub mod headers;
pub mod request;
pub mod server;

pub use client::{build_client, HttpClient};
pub use request::{RequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
