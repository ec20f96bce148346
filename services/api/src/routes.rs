use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use maat_court_data::consumer::MessageDispatcher;
use maat_court_data::link::link_router;
use maat_court_data::status::status_router;
use maat_court_data::store::CourtDataStore;
use serde_json::json;

/// Court data endpoints plus the operational health checks.
pub(crate) fn court_data_routes<S>(dispatcher: &MessageDispatcher<S>) -> Router
where
    S: CourtDataStore + 'static,
{
    link_router(dispatcher.link_service())
        .merge(status_router(dispatcher.status_service()))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use maat_court_data::config::ProcessingConfig;
    use maat_court_data::store::SqliteStore;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(ready: bool) -> Router {
        let store = Arc::new(SqliteStore::in_memory().expect("in-memory store opens"));
        let dispatcher = MessageDispatcher::new(store, ProcessingConfig::default());
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        court_data_routes(&dispatcher).layer(Extension(state))
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;

        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_tracks_the_flag() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn link_routes_are_mounted() {
        let response = app(true)
            .oneshot(
                Request::post("/link/validate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header("Laa-Transaction-Id", "c1a2")
                    .body(Body::from(json!({ "maatId": 1000 }).to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["code"], "INVALID_MAAT_ID");
        assert_eq!(body["message"], "1000 is Not a Valid MAAT ID");
    }

    #[tokio::test]
    async fn status_routes_are_mounted() {
        let response = app(true)
            .oneshot(
                Request::post("/laa-status/validate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "maatId": 77 }).to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(
            body["messages"],
            json!([
                "77 is Not a Valid MAAT ID",
                "CaseURN can't be null or empty on request."
            ])
        );
    }

    #[tokio::test]
    async fn metrics_are_rendered_as_text() {
        let response = app(true)
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request builds"))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}
