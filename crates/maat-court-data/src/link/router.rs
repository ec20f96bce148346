use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::info;

use super::service::LinkService;
use crate::domain::messages::{LinkRequest, UnlinkRequest};
use crate::error::{blocking_failure, transaction_header};
use crate::store::CourtDataStore;

/// Router builder exposing the validate, link, and unlink endpoints.
pub fn link_router<S>(service: Arc<LinkService<S>>) -> Router
where
    S: CourtDataStore + 'static,
{
    Router::new()
        .route("/link/validate", post(validate_handler::<S>))
        .route("/link/create", post(create_handler::<S>))
        .route("/unlink", post(unlink_handler::<S>))
        .with_state(service)
}

pub(crate) async fn validate_handler<S>(
    State(service): State<Arc<LinkService<S>>>,
    headers: HeaderMap,
    Json(request): Json<LinkRequest>,
) -> Response
where
    S: CourtDataStore + 'static,
{
    info!(
        laa_transaction_id = transaction_header(&headers),
        maat_id = ?request.maat_id,
        "link validation requested"
    );
    match tokio::task::spawn_blocking(move || service.validate(&request)).await {
        Ok(Ok(maat_id)) => {
            (StatusCode::OK, Json(json!({ "maatId": maat_id, "valid": true }))).into_response()
        }
        Ok(Err(error)) => error.into_response(),
        Err(join_error) => blocking_failure(join_error),
    }
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<LinkService<S>>>,
    headers: HeaderMap,
    Json(request): Json<LinkRequest>,
) -> Response
where
    S: CourtDataStore + 'static,
{
    info!(
        laa_transaction_id = transaction_header(&headers),
        maat_id = ?request.maat_id,
        "link requested"
    );
    match tokio::task::spawn_blocking(move || service.save_and_link(&request)).await {
        Ok(Ok(outcome)) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Ok(Err(error)) => error.into_response(),
        Err(join_error) => blocking_failure(join_error),
    }
}

pub(crate) async fn unlink_handler<S>(
    State(service): State<Arc<LinkService<S>>>,
    headers: HeaderMap,
    Json(request): Json<UnlinkRequest>,
) -> Response
where
    S: CourtDataStore + 'static,
{
    info!(
        laa_transaction_id = transaction_header(&headers),
        maat_id = ?request.maat_id,
        "unlink requested"
    );
    match tokio::task::spawn_blocking(move || service.unlink(&request)).await {
        Ok(Ok(outcome)) => (StatusCode::OK, Json(outcome)).into_response(),
        Ok(Err(error)) => error.into_response(),
        Err(join_error) => blocking_failure(join_error),
    }
}
