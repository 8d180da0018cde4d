//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Classified request (not a redirect):
//!     → client_ip.rs (trusted header, forwarded-for, "unknown")
//!     → rate_limit.rs (fixed-window check against the counter store)
//!     → Allowed: dispatch, then attach quota headers
//!     → Denied: 429 with retry guidance
//!
//! Forwarding:
//!     → headers.rs (strip hop-by-hop, add CORS or hardening headers)
//! ```
//!
//! # Design Decisions
//! - Fail open: a counter store fault never blocks a request
//! - Clients without an IP header share one counter

pub mod client_ip;
pub mod headers;
pub mod rate_limit;

pub use rate_limit::{Allowed, Denied, RateLimitHeaders, RateLimiter};
