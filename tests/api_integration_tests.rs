//! Integration Tests for the admin API
//!
//! Checks that the admin endpoints report on the same cache the proxy fills.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cache_proxy::api::{create_router, AdminState};
use common::{proxy_request, send_through_proxy, MockOrigin, RunningProxy, ORIGIN_RESPONSE};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let origin = MockOrigin::start().await;
    let proxy = RunningProxy::start(&origin, 30).await;
    let app = create_router(AdminState::new(proxy.cache.clone()));

    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());

    proxy.shutdown().await;
}

#[tokio::test]
async fn test_stats_track_proxy_traffic() {
    let origin = MockOrigin::start().await;
    let proxy = RunningProxy::start(&origin, 2).await;
    let app = create_router(AdminState::new(proxy.cache.clone()));

    send_through_proxy(proxy.port, &proxy_request("/a")).await;
    send_through_proxy(proxy.port, &proxy_request("/a")).await;
    send_through_proxy(proxy.port, &proxy_request("/b")).await;
    send_through_proxy(proxy.port, &proxy_request("/c")).await;

    let (status, json) = get_json(app, "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 3);
    assert_eq!(json["insertions"], 3);
    assert_eq!(json["evictions"], 1);
    assert_eq!(json["total_entries"], 2);
    assert_eq!(json["capacity"], 2);
    assert_eq!(json["eviction_policy"], "lru");
    assert_eq!(json["hit_rate"], 0.25);
    assert_eq!(json["stored_bytes"], 2 * ORIGIN_RESPONSE.len());
    assert!(json["oldest_entry_age_secs"].is_i64());

    proxy.shutdown().await;
}

#[tokio::test]
async fn test_stats_on_fresh_cache() {
    let origin = MockOrigin::start().await;
    let proxy = RunningProxy::start(&origin, 30).await;
    let app = create_router(AdminState::new(proxy.cache.clone()));

    let (status, json) = get_json(app, "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_entries"], 0);
    assert_eq!(json["hit_rate"], 0.0);
    assert_eq!(json["stored_bytes"], 0);
    assert!(json["oldest_entry_age_secs"].is_null());

    proxy.shutdown().await;
}
