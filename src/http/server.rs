//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the edge handler as catch-all
//! - Wire up middleware (request ID, tracing, concurrency limit, timeout)
//! - Bind server to a plain or TLS listener with graceful shutdown
//! - Per request: classify → rate limit → dispatch → merge quota headers

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::EdgeConfig;
use crate::http::dispatch::dispatch;
use crate::http::request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
use crate::http::upstream::Upstream;
use crate::observability::metrics;
use crate::routing::{Router as EdgeRouter, RoutingDecision};
use crate::security::client_ip::resolve_client_ip;
use crate::security::rate_limit::RateLimiter;
use crate::store::{build_store, CounterStore};

/// Grace period for in-flight requests once shutdown is signalled (TLS listener).
const TLS_DRAIN_SECS: u64 = 30;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<EdgeRouter>,
    pub limiter: Arc<RateLimiter>,
    pub upstream: Upstream,
    pub client_ip_header: Arc<str>,
    pub forwarded_header: Arc<str>,
}

/// HTTP server for the edge router.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
}

impl HttpServer {
    /// Create a server with the counter store selected by configuration.
    pub fn new(config: EdgeConfig) -> Self {
        let store = build_store(&config);
        Self::with_store(config, store)
    }

    /// Create a server with an explicit counter store.
    pub fn with_store(config: EdgeConfig, store: Arc<dyn CounterStore>) -> Self {
        tracing::info!(
            store = store.name(),
            max_requests = config.rate_limit.max_requests,
            window_secs = config.rate_limit.window_secs,
            "Rate limiter configured"
        );

        let state = AppState {
            router: Arc::new(EdgeRouter::from_config(&config.routing, &config.origins)),
            limiter: Arc::new(RateLimiter::new(&config.rate_limit, store)),
            upstream: Upstream::new(),
            client_ip_header: config.rate_limit.client_ip_header.as_str().into(),
            forwarded_header: config.rate_limit.forwarded_header.as_str().into(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers are listed innermost first.
    #[allow(deprecated)]
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", any(edge_handler))
            .route("/{*path}", any(edge_handler))
            .with_state(state);

        let router = match config.timeouts.request_secs {
            Some(secs) => router.layer(TimeoutLayer::new(Duration::from_secs(secs))),
            None => router,
        };

        router
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request.request_id(),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// Run the server on a plain TCP listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }
}

/// Edge handler: classify, gate, dispatch.
async fn edge_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let decision = state
        .router
        .classify(request.uri().path(), request.uri().query());
    let category = decision.category();

    tracing::debug!(category = %category, upstream = ?decision.upstream(), "Classified request");

    let quota = if let RoutingDecision::Redirect { .. } = decision {
        None
    } else {
        let client_ip = resolve_client_ip(
            request.headers(),
            &state.client_ip_header,
            &state.forwarded_header,
        );
        match state.limiter.check(&client_ip, request.uri().path()).await {
            Ok(allowed) => allowed.headers,
            Err(denied) => {
                let response = denied.into_response();
                metrics::record_request(category.as_str(), response.status().as_u16(), start);
                return response;
            }
        }
    };

    let (parts, body) = request.into_parts();
    let mut response = dispatch(&state.upstream, &decision, &parts, body).await;

    if let Some(quota) = quota {
        quota.apply(response.headers_mut());
    }

    metrics::record_request(category.as_str(), response.status().as_u16(), start);
    response
}
