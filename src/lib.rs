//! Edge router: path-based origin routing with fixed-window rate limiting.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;
pub mod store;

pub use config::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
