//! Admin router tests driven through `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use route_normalizer::admin::{setup_admin_router, AdminState};
use route_normalizer::config::ServiceConfig;

mod common;
use common::{scripted_service, ACTIVITIES, CATALOG, ENTRY_RULES, TENANTS};

const KEY: &str = "test-admin-key";

fn request(method: &str, uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("Authorization", format!("Bearer {key}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn router() -> (axum::Router, std::sync::Arc<route_normalizer::control_plane::ScriptedTransport>) {
    let (service, transport, _clock) = scripted_service(&ServiceConfig::default());
    transport.respond(CATALOG, r#"{"data": {"shop": ["/order/{id}#GET", "/order/{id}/items#POST"]}}"#);
    transport.respond(
        TENANTS,
        r#"{"data": [{"tenantAppKey": "acme", "envAppMap": {"prod": ["shop"]}}]}"#,
    );
    transport.respond(ENTRY_RULES, r#"{"data": {"shop": ["/order/{id}"]}}"#);
    transport.respond(
        ACTIVITIES,
        r#"{"data": [{"isVirtual": 1, "serviceName": "/mq/{topic}", "applicationName": "broker"}]}"#,
    );
    (setup_admin_router(AdminState::new(service, KEY)), transport)
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let (app, _transport) = router();

    let missing = app.clone().oneshot(request("GET", "/admin/status", None)).await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .clone()
        .oneshot(request("GET", "/admin/status", Some("nope")))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let ok = app.oneshot(request("GET", "/admin/status", Some(KEY))).await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body = json(ok).await;
    assert_eq!(body["catalog_generation"], 0);
    assert_eq!(body["tenant_lookup_enabled"], false);
}

#[tokio::test]
async fn test_refresh_then_resolve() {
    let (app, _transport) = router();

    let refreshed = app
        .clone()
        .oneshot(request("POST", "/admin/refresh", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(refreshed.status(), StatusCode::OK);
    let body = json(refreshed).await;
    assert_eq!(body["catalog_refreshed"], true);
    assert_eq!(body["tenants_refreshed"], true);
    assert_eq!(body["status"]["catalog_templates"], 2);

    let resolved = app
        .oneshot(request(
            "GET",
            "/admin/resolve?app=shop&method=post&url=http%3A%2F%2Fhost%2Forder%2F9%2Fitems",
            Some(KEY),
        ))
        .await
        .unwrap();
    let body = json(resolved).await;
    assert_eq!(body["route"], "/order/{id}/items");
}

#[tokio::test]
async fn test_tenant_shows_gated_and_live_binding() {
    let (app, _transport) = router();
    app.clone()
        .oneshot(request("POST", "/admin/refresh", Some(KEY)))
        .await
        .unwrap();

    let response = app
        .oneshot(request("GET", "/admin/tenant?app=shop", Some(KEY)))
        .await
        .unwrap();
    let body = json(response).await;
    assert_eq!(body["lookup_enabled"], false);
    assert_eq!(body["effective"]["tenant_key"], "default");
    assert_eq!(body["effective"]["env_code"], "test");
    assert_eq!(body["live"]["tenant_key"], "acme");
    assert_eq!(body["live"]["env_code"], "prod");
}

#[tokio::test]
async fn test_activity_reports_application() {
    let (app, transport) = router();

    let response = app
        .oneshot(request("GET", "/admin/activity?task_id=12&path=/mq/orders", Some(KEY)))
        .await
        .unwrap();
    let body = json(response).await;
    assert_eq!(body["route"], "/mq/{topic}");
    assert_eq!(body["application_name"], "broker");
    assert_eq!(transport.calls_to(ACTIVITIES), 1);
}

#[tokio::test]
async fn test_missing_query_parameter_is_rejected() {
    let (app, _transport) = router();
    let response = app
        .oneshot(request("GET", "/admin/resolve?app=shop", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_flush_caches_forces_refetch() {
    let (app, transport) = router();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request(
                "GET",
                "/admin/entry-rule?tenant_key=acme&env_code=prod&app=shop&path=/order/3",
                Some(KEY),
            ))
            .await
            .unwrap();
        assert_eq!(json(response).await["route"], "/order/{id}");
    }
    app.clone()
        .oneshot(request("GET", "/admin/activity?task_id=12&path=/mq/orders", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(transport.calls_to(ENTRY_RULES), 1);

    let flushed = app
        .clone()
        .oneshot(request("POST", "/admin/caches/flush", Some(KEY)))
        .await
        .unwrap();
    let body = json(flushed).await;
    assert_eq!(body["entry_rules_flushed"], 1);
    assert_eq!(body["activities_flushed"], 1);

    let status = json(app.clone().oneshot(request("GET", "/admin/status", Some(KEY))).await.unwrap()).await;
    assert_eq!(status["entry_rule_cache_entries"], 0);
    assert_eq!(status["activity_cache_entries"], 0);

    app.oneshot(request(
        "GET",
        "/admin/entry-rule?tenant_key=acme&env_code=prod&app=shop&path=/order/3",
        Some(KEY),
    ))
    .await
    .unwrap();
    assert_eq!(transport.calls_to(ENTRY_RULES), 2);
}
