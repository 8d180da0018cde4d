//! Routing subsystem (request classifier).
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → router.rs (ordered rule scan)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: RoutingDecision (redirect, shell, static asset, legacy)
//!
//! Rule Compilation (at startup):
//!     RoutingConfig + OriginsConfig
//!     → Build matchers per category
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always yields the same decision
//! - First match wins, legacy origin is the catch-all

pub mod matcher;
pub mod router;

pub use router::{RouteCategory, Router, RoutingDecision};
