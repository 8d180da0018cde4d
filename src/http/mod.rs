//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, edge handler)
//!     → request.rs (request ID)
//!     → [routing classifies, security rate-limits]
//!     → dispatch.rs (one origin fetch per decision)
//!     → upstream.rs (streamed client request)
//!     → response.rs (content type, CORS, hardening headers)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
pub use upstream::{Upstream, UpstreamError};
