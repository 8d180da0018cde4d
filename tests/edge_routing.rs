//! End-to-end routing tests: classification, origin fetch, header rewriting.

use axum::http::StatusCode;

mod common;

use common::{client, edge_config, start_edge, start_origin};

#[tokio::test]
async fn test_section_root_redirects_without_fetch() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let edge = start_edge(edge_config(&static_origin, &legacy_origin)).await;

    let res = client()
        .get(edge.url("/public/pats?ref=mail"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()["location"], "/public/pats/");
    assert!(res.headers().get("x-ratelimit-limit").is_none());
    assert_eq!(static_origin.hits() + legacy_origin.hits(), 0);
}

#[tokio::test]
async fn test_section_item_serves_shell_html() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let edge = start_edge(edge_config(&static_origin, &legacy_origin)).await;

    let res = client()
        .get(edge.url("/public/pats/42?ref=x"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.headers()["access-control-allow-methods"], "GET, HEAD, OPTIONS");
    assert_eq!(res.headers()["x-seen-host"], static_origin.addr.to_string());
    assert_eq!(
        res.text().await.unwrap(),
        "static GET /public/pats/index.html?ref=x "
    );
    assert_eq!(legacy_origin.hits(), 0);
}

#[tokio::test]
async fn test_shell_with_trailing_slash() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let edge = start_edge(edge_config(&static_origin, &legacy_origin)).await;

    for path in ["/public/pats/", "/public/pats/7/"] {
        let res = client().get(edge.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        assert!(res.text().await.unwrap().starts_with("static GET /public/pats/index.html"));
    }
}

#[tokio::test]
async fn test_shell_unavailable_keeps_origin_status() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let mut config = edge_config(&static_origin, &legacy_origin);
    config.routing.shell_html_path = "/missing/index.html".into();
    let edge = start_edge(config).await;

    let res = client().get(edge.url("/public/pats/1")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert_eq!(res.text().await.unwrap(), "Page shell unavailable (404)");
}

#[tokio::test]
async fn test_root_file_from_static_origin() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let edge = start_edge(edge_config(&static_origin, &legacy_origin)).await;

    let res = client().get(edge.url("/ads.txt")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-origin"], "static");
    assert_eq!(res.headers()["content-type"], "text/plain; charset=utf-8");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert!(res.headers().get("x-content-type-options").is_none());
    assert_eq!(res.text().await.unwrap(), "static GET /ads.txt ");
}

#[tokio::test]
async fn test_stylesheet_content_type_forced() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let edge = start_edge(edge_config(&static_origin, &legacy_origin)).await;

    let res = client()
        .get(edge.url("/styles/app.css"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/css; charset=utf-8");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    let res = client()
        .get(edge.url("/_next/static/chunks/main.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        res.headers()["content-type"],
        "application/javascript; charset=utf-8"
    );
}

#[tokio::test]
async fn test_internal_query_marker_goes_to_static_origin() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let edge = start_edge(edge_config(&static_origin, &legacy_origin)).await;

    let res = client()
        .get(edge.url("/account/settings?_rsc=1a2b"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-origin"], "static");
    assert_eq!(
        res.text().await.unwrap(),
        "static GET /account/settings?_rsc=1a2b "
    );
}

#[tokio::test]
async fn test_unmatched_path_hardened_from_legacy_origin() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let edge = start_edge(edge_config(&static_origin, &legacy_origin)).await;

    let res = client()
        .get(edge.url("/some/unmatched/page?x=1"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-origin"], "legacy");
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert_eq!(res.headers()["x-frame-options"], "SAMEORIGIN");
    assert_eq!(res.headers()["content-type"], "text/plain; charset=utf-8");
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert_eq!(
        res.text().await.unwrap(),
        "legacy GET /some/unmatched/page?x=1 "
    );
    assert_eq!(static_origin.hits(), 0);
}

#[tokio::test]
async fn test_non_numeric_section_item_is_legacy() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let edge = start_edge(edge_config(&static_origin, &legacy_origin)).await;

    let res = client()
        .get(edge.url("/public/pats/abc"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-origin"], "legacy");
}

#[tokio::test]
async fn test_request_body_streamed_to_origin() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let edge = start_edge(edge_config(&static_origin, &legacy_origin)).await;

    let res = client()
        .post(edge.url("/api/submit"))
        .body("name=value")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.text().await.unwrap(),
        "legacy POST /api/submit name=value"
    );
}

#[tokio::test]
async fn test_unreachable_origin_returns_500() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let mut config = edge_config(&static_origin, &legacy_origin);
    // Nothing listens on the discard port.
    config.origins.legacy_origin = "http://127.0.0.1:9".into();
    let edge = start_edge(config).await;

    let res = client().get(edge.url("/about")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await.unwrap(), "Failed to fetch from origin");
}

#[tokio::test]
async fn test_request_id_on_every_response() {
    let static_origin = start_origin("static").await;
    let legacy_origin = start_origin("legacy").await;
    let edge = start_edge(edge_config(&static_origin, &legacy_origin)).await;

    let res = client().get(edge.url("/public/pats")).send().await.unwrap();
    assert!(res.headers().get("x-request-id").is_some());

    let res = client()
        .get(edge.url("/about"))
        .header("x-request-id", "trace-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-123");
}
