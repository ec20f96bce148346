use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::info;

use super::StatusUpdateService;
use crate::domain::messages::StatusUpdateRequest;
use crate::error::{blocking_failure, transaction_header};
use crate::store::CourtDataStore;

pub fn status_router<S>(service: Arc<StatusUpdateService<S>>) -> Router
where
    S: CourtDataStore + 'static,
{
    Router::new()
        .route("/laa-status/validate", post(validate_handler::<S>))
        .route("/laa-status", post(update_handler::<S>))
        .with_state(service)
}

pub(crate) async fn validate_handler<S>(
    State(service): State<Arc<StatusUpdateService<S>>>,
    headers: HeaderMap,
    Json(request): Json<StatusUpdateRequest>,
) -> Response
where
    S: CourtDataStore + 'static,
{
    info!(
        laa_transaction_id = transaction_header(&headers),
        maat_id = ?request.maat_id,
        "status update validation requested"
    );
    match tokio::task::spawn_blocking(move || service.validate(&request)).await {
        Ok(Ok(messages)) if messages.is_empty() => (StatusCode::OK, Json(messages)).into_response(),
        Ok(Ok(messages)) => (StatusCode::BAD_REQUEST, Json(messages)).into_response(),
        Ok(Err(error)) => error.into_response(),
        Err(join_error) => blocking_failure(join_error),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<StatusUpdateService<S>>>,
    headers: HeaderMap,
    Json(request): Json<StatusUpdateRequest>,
) -> Response
where
    S: CourtDataStore + 'static,
{
    info!(
        laa_transaction_id = transaction_header(&headers),
        maat_id = ?request.maat_id,
        "status update requested"
    );
    match tokio::task::spawn_blocking(move || service.execute(&request)).await {
        Ok(Ok(outcome)) => (StatusCode::OK, Json(outcome)).into_response(),
        Ok(Err(error)) => error.into_response(),
        Err(join_error) => blocking_failure(join_error),
    }
}
