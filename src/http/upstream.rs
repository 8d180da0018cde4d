//! Outbound fetches to the origins.
//!
//! One `hyper-util` client over an HTTPS-or-HTTP connector is shared by all
//! handlers. Request and response bodies are streamed, never buffered, and
//! no timeout is imposed here; dropping the returned future cancels the fetch.

use axum::{
    body::Body,
    http::{header, request::Parts, Request, Response, Uri},
};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::security::headers::strip_hop_by_hop;

/// Errors from an upstream fetch.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream url {0:?}")]
    InvalidUri(String),
    #[error("failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),
    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),
}

/// Shared origin client.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: Client<HttpsConnector<HttpConnector>, Body>,
}

impl Upstream {
    pub fn new() -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }

    /// Forward the inbound method, headers and body to `target`.
    ///
    /// `Host` is dropped so the client derives it from the origin URL.
    pub async fn forward(
        &self,
        parts: &Parts,
        body: Body,
        target: &str,
    ) -> Result<Response<Incoming>, UpstreamError> {
        let uri: Uri = target
            .parse()
            .map_err(|_| UpstreamError::InvalidUri(target.to_string()))?;

        let mut headers = parts.headers.clone();
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);

        let mut request = Request::builder()
            .method(parts.method.clone())
            .uri(uri)
            .body(body)?;
        *request.headers_mut() = headers;

        Ok(self.client.request(request).await?)
    }
}

impl Default for Upstream {
    fn default() -> Self {
        Self::new()
    }
}
