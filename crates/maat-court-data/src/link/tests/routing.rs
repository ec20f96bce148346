use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::link::link_router;

fn router() -> (Arc<crate::store::testing::InstrumentedStore>, axum::Router) {
    let store = seeded_store();
    let router = link_router(Arc::new(service(&store)));
    (store, router)
}

#[tokio::test]
async fn create_route_links_and_returns_identifiers() {
    let (_store, router) = router();
    let body = serde_json::to_value(link_request()).expect("request serializes");

    let response = router
        .oneshot(json_request("/link/create", &body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json(response).await;
    assert_eq!(payload["maatId"], json!(MAAT_ID));
    assert!(payload["txId"].is_i64());
    assert!(payload["caseId"].is_i64());
}

#[tokio::test]
async fn duplicate_link_is_a_conflict() {
    let (_store, router) = router();
    let body = serde_json::to_value(link_request()).expect("request serializes");

    let first = router
        .clone()
        .oneshot(json_request("/link/create", &body))
        .await
        .expect("router responds");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router
        .oneshot(json_request("/link/create", &body))
        .await
        .expect("router responds");
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let payload = read_json(second).await;
    assert_eq!(payload["code"], "ALREADY_LINKED");
    assert_eq!(
        payload["message"],
        format!("{MAAT_ID}: MaatId already linked to the application.")
    );
}

#[tokio::test]
async fn validate_route_reports_missing_maat_id() {
    let (store, router) = router();

    let response = router
        .oneshot(json_request("/link/validate", &json!({ "caseUrn": CASE_URN })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "INVALID_MAAT_ID");
    assert_eq!(payload["message"], "MAAT id is missing.");
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn validate_route_accepts_valid_request_without_writing() {
    let (store, router) = router();
    let body = serde_json::to_value(link_request()).expect("request serializes");

    let response = router
        .oneshot(json_request("/link/validate", &body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["valid"], json!(true));
    assert!(store.write_sequence().is_empty());
}

#[tokio::test]
async fn unknown_court_location_is_unprocessable() {
    let (_store, router) = router();
    let mut body = serde_json::to_value(link_request()).expect("request serializes");
    body["cjsLocation"] = json!("ZZ999");

    let response = router
        .oneshot(json_request("/link/create", &body))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_json(response).await["code"], "UNKNOWN_COURT_CODE");
}

#[tokio::test]
async fn unlink_route_reports_not_linked() {
    let (_store, router) = router();

    let response = router
        .oneshot(json_request("/unlink", &json!({ "maatId": MAAT_ID, "userId": "cw1" })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["code"], "NOT_LINKED");
}

#[tokio::test]
async fn malformed_body_is_rejected_by_the_extractor() {
    let (store, router) = router();

    let response = router
        .oneshot(
            Request::post("/link/create")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"maatId\": "))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert!(response.status().is_client_error());
    assert!(store.calls().is_empty());
}
