//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Router,
};
use edge_router::config::EdgeConfig;
use edge_router::store::CounterStore;
use edge_router::{HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A mock origin that echoes what it received.
#[derive(Clone)]
pub struct MockOrigin {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockOrigin {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct OriginState {
    name: &'static str,
    hits: Arc<AtomicUsize>,
}

/// Start an origin on an ephemeral port.
///
/// Responds `200` with body `"{name} {METHOD} {path?query} {body}"` and
/// echoes the `Host` it saw in `x-seen-host`. Paths containing `missing`
/// return `404`.
pub async fn start_origin(name: &'static str) -> MockOrigin {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = OriginState {
        name,
        hits: hits.clone(),
    };
    let app = Router::new().fallback(origin_handler).with_state(state);
    let addr = serve(app).await;
    MockOrigin { addr, hits }
}

async fn origin_handler(
    State(state): State<OriginState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let seen_host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let status = if uri.path().contains("missing") {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let body = format!(
        "{} {} {} {}",
        state.name,
        method,
        path_and_query,
        String::from_utf8_lossy(&body)
    );

    (
        status,
        [
            ("x-origin", state.name.to_string()),
            ("x-seen-host", seen_host),
            ("x-frame-options", "DENY".to_string()),
        ],
        body,
    )
}

/// In-memory REST key-value store, optionally failing every call.
#[derive(Clone)]
pub struct MockKvStore {
    pub addr: SocketAddr,
    values: Arc<Mutex<HashMap<String, String>>>,
    ttls: Arc<Mutex<Vec<u64>>>,
    calls: Arc<AtomicUsize>,
}

impl MockKvStore {
    pub fn url(&self) -> String {
        format!("http://{}/kv", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn ttls(&self) -> Vec<u64> {
        self.ttls.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }
}

pub async fn start_kv_store(failing: bool) -> MockKvStore {
    let store = MockKvStore {
        addr: "127.0.0.1:0".parse().unwrap(),
        values: Arc::new(Mutex::new(HashMap::new())),
        ttls: Arc::new(Mutex::new(Vec::new())),
        calls: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/kv/values/{key}", get(kv_get).put(kv_put))
        .with_state((store.clone(), failing));
    let addr = serve(app).await;
    MockKvStore { addr, ..store }
}

async fn kv_get(
    State((store, failing)): State<(MockKvStore, bool)>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    store.calls.fetch_add(1, Ordering::SeqCst);
    if failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new());
    }
    match store.values.lock().unwrap().get(&key) {
        Some(value) => (StatusCode::OK, value.clone()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn kv_put(
    State((store, failing)): State<(MockKvStore, bool)>,
    Path(key): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> StatusCode {
    store.calls.fetch_add(1, Ordering::SeqCst);
    if failing {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    if let Some(ttl) = params.get("expiration_ttl").and_then(|t| t.parse().ok()) {
        store.ttls.lock().unwrap().push(ttl);
    }
    store.values.lock().unwrap().insert(key, body);
    StatusCode::OK
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Config pointing at the two mock origins, everything else default.
pub fn edge_config(static_origin: &MockOrigin, legacy_origin: &MockOrigin) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.origins.static_origin = static_origin.url();
    config.origins.legacy_origin = legacy_origin.url();
    config
}

/// A running edge router.
pub struct Edge {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Edge {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Edge {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_edge(config: EdgeConfig) -> Edge {
    launch(HttpServer::new(config)).await
}

pub async fn start_edge_with_store(config: EdgeConfig, store: Arc<dyn CounterStore>) -> Edge {
    launch(HttpServer::with_store(config, store)).await
}

async fn launch(server: HttpServer) -> Edge {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    Edge { addr, shutdown }
}

/// Client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// Sleep past the next window boundary if fewer than `margin` remain in
/// the current one, so a burst of requests lands in a single window.
pub async fn avoid_window_edge(window_secs: u64, margin: Duration) {
    let window_ms = window_secs * 1000;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;
    let left = window_ms - now % window_ms;
    if left < margin.as_millis() as u64 {
        tokio::time::sleep(Duration::from_millis(left + 50)).await;
    }
}
