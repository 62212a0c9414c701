//! Integration tests for the API server.

use std::sync::Arc;
use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use lending::LendingPolicy;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    setup_with_policy(LendingPolicy::default())
}

fn setup_with_policy(policy: LendingPolicy) -> axum::Router {
    api::create_app(api::create_state(policy), get_metrics_handle())
}

fn setup_with_state() -> (axum::Router, Arc<api::routes::AppState>) {
    let state = api::create_state(LendingPolicy::default());
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

async fn add_item(app: &axum::Router, name: &str, quantity: u32) -> u64 {
    let (status, json) = send(
        app,
        "POST",
        "/items",
        Some(serde_json::json!({ "name": name, "quantity": quantity })),
    )
    .await;
    assert!(status.is_success(), "add item failed: {json}");
    json["item"]["id"].as_u64().unwrap()
}

fn loan(actor: &str, item_id: u64, quantity: u32) -> Option<serde_json::Value> {
    Some(serde_json::json!({
        "actor_id": actor,
        "item_id": item_id,
        "quantity": quantity
    }))
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["items"], 0);
    assert_eq!(json["open_loans"], 0);
}

#[tokio::test]
async fn test_add_item_then_merge_by_name() {
    let app = setup();

    let (status, created) = send(
        &app,
        "POST",
        "/items",
        Some(serde_json::json!({ "name": "Ball", "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["merged"], false);
    assert_eq!(created["item"]["id"], 1001);

    let (status, merged) = send(
        &app,
        "POST",
        "/items",
        Some(serde_json::json!({ "name": "BALL", "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(merged["merged"], true);
    assert_eq!(merged["item"]["total"], 8);
    assert_eq!(merged["item"]["available"], 8);
}

#[tokio::test]
async fn test_add_item_blank_name_is_bad_request() {
    let app = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/items",
        Some(serde_json::json!({ "name": "  ", "quantity": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_search_items() {
    let app = setup();
    add_item(&app, "Football", 1).await;
    add_item(&app, "Whistle", 1).await;

    let (status, json) = send(&app, "GET", "/items?q=ball", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Football");

    let (_, all) = send(&app, "GET", "/items", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_item_not_found_and_bad_id() {
    let app = setup();

    let (status, _) = send(&app, "GET", "/items/4242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/items/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_borrow_and_partial_return() {
    let app = setup();
    let id = add_item(&app, "Projector", 20).await;

    let (status, first) = send(&app, "POST", "/loans/borrow", loan("s1", id, 10)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["loan"]["status"], "Open");
    assert_eq!(first["item"]["available"], 10);

    send(&app, "POST", "/loans/borrow", loan("s1", id, 5)).await;

    let (status, returned) = send(&app, "POST", "/loans/return", loan("S1", id, 3)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["accepted"], 3);
    assert_eq!(returned["capped"], false);
    assert_eq!(returned["item"]["available"], 8);

    let (_, history) = send(&app, "GET", "/transactions", None).await;
    let quantities: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|l| (l["quantity"].as_u64().unwrap(), l["status"].as_str().unwrap().to_string()))
        .collect();
    assert_eq!(
        quantities,
        vec![
            (10, "Open".to_string()),
            (3, "Closed".to_string()),
            (2, "Open".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_borrow_insufficient_stock_is_conflict() {
    let app = setup();
    let id = add_item(&app, "Projector", 1).await;

    let (status, json) = send(&app, "POST", "/loans/borrow", loan("s1", id, 2)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("Insufficient stock"));
}

#[tokio::test]
async fn test_borrow_unknown_item_is_not_found() {
    let app = setup();
    let (status, _) = send(&app, "POST", "/loans/borrow", loan("s1", 9999, 1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_over_return_reports_discrepancy() {
    let app = setup();
    let id = add_item(&app, "Projector", 10).await;
    send(&app, "POST", "/loans/borrow", loan("s1", id, 6)).await;

    let (status, json) = send(&app, "POST", "/loans/return", loan("s1", id, 10)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["requested"], 10);
    assert_eq!(json["accepted"], 6);
    assert_eq!(json["owed"], 6);
    assert_eq!(json["capped"], true);
}

#[tokio::test]
async fn test_return_without_loan_is_conflict() {
    let app = setup();
    let id = add_item(&app, "Projector", 10).await;

    let (status, json) = send(&app, "POST", "/loans/return", loan("s1", id, 1)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("Nothing to return"));
}

#[tokio::test]
async fn test_exclusive_policy_rejects_second_borrow() {
    let app = setup_with_policy(LendingPolicy::default().with_exclusive_loans(true));
    let id = add_item(&app, "Projector", 10).await;
    send(&app, "POST", "/loans/borrow", loan("s1", id, 1)).await;

    let (status, json) = send(&app, "POST", "/loans/borrow", loan("s1", id, 1)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("Policy violation"));
}

#[tokio::test]
async fn test_reduce_and_delete_item() {
    let (app, state) = setup_with_state();
    let id = add_item(&app, "Tent", 5).await;
    send(&app, "POST", "/loans/borrow", loan("s1", id, 3)).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/items/{id}/reduce"),
        Some(serde_json::json!({ "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, reduced) = send(
        &app,
        "POST",
        &format!("/items/{id}/reduce"),
        Some(serde_json::json!({ "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reduced["total"], 3);
    assert_eq!(reduced["available"], 0);

    let (status, _) = send(&app, "DELETE", &format!("/items/{id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(&app, "POST", "/loans/return", loan("s1", id, 3)).await;
    let (status, _) = send(&app, "DELETE", &format!("/items/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.service.list_items().await.is_empty());
}

#[tokio::test]
async fn test_transactions_filters() {
    let app = setup();
    let id = add_item(&app, "Projector", 10).await;
    send(&app, "POST", "/loans/borrow", loan("s1", id, 1)).await;
    send(&app, "POST", "/loans/borrow", loan("s2", id, 1)).await;
    send(&app, "POST", "/loans/return", loan("s1", id, 1)).await;

    let (_, open) = send(&app, "GET", "/transactions?status=open", None).await;
    let open = open.as_array().unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["actor_id"], "s2");

    let (_, by_actor) = send(&app, "GET", "/transactions?actor=S1", None).await;
    let by_actor = by_actor.as_array().unwrap();
    assert_eq!(by_actor.len(), 1);
    assert_eq!(by_actor[0]["status"], "Closed");
    assert!(by_actor[0]["returned_at"].is_string());

    let (status, _) = send(&app, "GET", "/transactions?status=late", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let id = add_item(&app, "Projector", 10).await;
    send(&app, "POST", "/loans/borrow", loan("s1", id, 2)).await;

    let text = scrape_metrics(&app).await;
    assert!(text.contains("lending_borrows_total"));
}

async fn scrape_metrics(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_invalid_borrow_counts_rejection() {
    let app = setup();
    let id = add_item(&app, "Tripod", 3).await;

    let (status, json) = send(&app, "POST", "/loans/borrow", loan("s1", id, 0)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, _) = send(&app, "POST", "/loans/return", loan("   ", id, 1)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let text = scrape_metrics(&app).await;
    assert!(
        text.lines().any(|line| line.starts_with("lending_rejections_total")
            && line.contains(r#"reason="invalid_argument""#)),
        "missing invalid_argument rejection in:\n{text}"
    );
}

#[tokio::test]
async fn test_malformed_quantity_is_json_bad_request() {
    let app = setup();
    let id = add_item(&app, "Easel", 2).await;

    let negative = serde_json::json!({ "actor_id": "s1", "item_id": id, "quantity": -1 });
    let (status, json) = send(&app, "POST", "/loans/borrow", Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some_and(|msg| !msg.is_empty()));

    let textual = serde_json::json!({ "quantity": "many" });
    let (status, json) = send(&app, "POST", &format!("/items/{id}/reduce"), Some(textual)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, item) = send(&app, "GET", &format!("/items/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["available"], 2);
}
