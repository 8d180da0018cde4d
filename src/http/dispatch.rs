//! Upstream dispatcher: one fetch per routing decision.

use axum::{body::Body, http::request::Parts, response::Response};

use crate::http::response;
use crate::http::upstream::Upstream;
use crate::routing::RoutingDecision;

/// Perform the fetch a decision calls for and shape the response.
///
/// Redirects never reach an origin.
pub async fn dispatch(
    upstream: &Upstream,
    decision: &RoutingDecision,
    parts: &Parts,
    body: Body,
) -> Response {
    let path = parts.uri.path();

    let (target, result) = match decision {
        RoutingDecision::Redirect { location } => return response::redirect(location),
        RoutingDecision::Shell { upstream: target }
        | RoutingDecision::StaticAsset { upstream: target }
        | RoutingDecision::Legacy { upstream: target } => {
            (target, upstream.forward(parts, body, target).await)
        }
    };

    let origin_response = match result {
        Ok(res) => res,
        Err(e) => {
            tracing::error!(
                path = %path,
                upstream = %target,
                category = %decision.category(),
                error = %e,
                "Origin fetch failed"
            );
            return response::fetch_failed();
        }
    };

    match decision {
        RoutingDecision::Shell { .. } => {
            if !origin_response.status().is_success() {
                tracing::warn!(
                    path = %path,
                    upstream = %target,
                    status = %origin_response.status(),
                    "Shell fetch returned non-success status"
                );
            }
            response::shell(origin_response)
        }
        RoutingDecision::StaticAsset { .. } => response::static_asset(path, origin_response),
        RoutingDecision::Legacy { .. } | RoutingDecision::Redirect { .. } => {
            response::legacy(origin_response)
        }
    }
}
