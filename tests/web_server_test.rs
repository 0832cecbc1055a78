//! Tests for the keep-alive web server
//!
//! Run with: cargo test --test web_server_test

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use common::temp_store;
use team_distributor::core::web_server::router;
use team_distributor::storage::EmptyTeams;

#[tokio::test]
async fn test_health_reports_registrations() {
    let (_dir, store) = temp_store(4, EmptyTeams::Omit);
    store.assign(1, "Ivanov Ivan").unwrap();
    store.assign(2, "Petrov Petr").unwrap();

    let response = router(store)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["registrations"], 2);
}

#[tokio::test]
async fn test_index_is_html_status_page() {
    let (_dir, store) = temp_store(4, EmptyTeams::Omit);

    let response = router(store)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("Зарегистрировано участников: 0"));
    assert!(html.contains("Команд: 4"));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (_dir, store) = temp_store(4, EmptyTeams::Omit);

    let response = router(store)
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
