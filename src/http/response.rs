//! Response shaping per routing category.
//!
//! # Responsibilities
//! - Relay upstream responses with streamed bodies
//! - Rewrite `Content-Type` where a category mandates it
//! - Add CORS or hardening headers
//! - Map fetch failures to short plain-text responses
//!
//! # Design Decisions
//! - Bodies are never inspected or buffered
//! - Hop-by-hop headers are stripped from relayed responses

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;

use crate::security::headers::{apply_cors, apply_hardening, strip_hop_by_hop};

const HTML_UTF8: &str = "text/html; charset=utf-8";

/// Forced `Content-Type` for static asset paths, if any.
pub fn content_type_override(path: &str) -> Option<&'static str> {
    if path.ends_with(".css") {
        Some("text/css; charset=utf-8")
    } else if path.ends_with(".js") {
        Some("application/javascript; charset=utf-8")
    } else {
        None
    }
}

/// 301 to the slash-terminated form of the path. No upstream fetch.
pub fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response(),
        Err(_) => fetch_failed(),
    }
}

/// Fetch to an origin failed before any response arrived.
pub fn fetch_failed() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch from origin").into_response()
}

/// Shell HTML: non-200 keeps the origin status with a short body, 200 is
/// relayed as UTF-8 HTML with permissive CORS.
pub fn shell(upstream: Response<Incoming>) -> Response {
    let status = upstream.status();
    if status != StatusCode::OK {
        return (status, format!("Page shell unavailable ({})", status.as_u16())).into_response();
    }

    relay(upstream, |headers| {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(HTML_UTF8));
        apply_cors(headers);
    })
}

/// Static asset: `.css`/`.js` content type forced, CORS added.
pub fn static_asset(path: &str, upstream: Response<Incoming>) -> Response {
    relay(upstream, |headers| {
        if let Some(content_type) = content_type_override(path) {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        apply_cors(headers);
    })
}

/// Legacy pass-through: content type untouched, hardening headers added.
pub fn legacy(upstream: Response<Incoming>) -> Response {
    relay(upstream, apply_hardening)
}

fn relay(upstream: Response<Incoming>, rewrite: impl FnOnce(&mut axum::http::HeaderMap)) -> Response {
    let (mut parts, body) = upstream.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    rewrite(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
