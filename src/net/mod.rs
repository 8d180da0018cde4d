//! Network layer.
//!
//! Plain TCP listeners are bound by the caller and handed to
//! `HttpServer::run`; this module covers TLS termination material for
//! `HttpServer::run_tls`.

pub mod tls;

pub use tls::{load_tls_config, TlsError};
