use crate::config::ConfigError;
use crate::consumer::PoolError;
use crate::domain::CourtDataError;
use crate::store::StoreError;
use crate::telemetry::TelemetryError;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Store(StoreError),
    Consumer(PoolError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
            AppError::Consumer(err) => write!(f, "consumer error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Consumer(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Consumer(_) | AppError::Store(StoreError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<PoolError> for AppError {
    fn from(value: PoolError) -> Self {
        Self::Consumer(value)
    }
}

/// Header carrying the caller's correlation id. Logged only.
pub const LAA_TRANSACTION_ID_HEADER: &str = "laa-transaction-id";

impl IntoResponse for CourtDataError {
    fn into_response(self) -> Response {
        let status = match &self {
            CourtDataError::Validation(_) | CourtDataError::NotFound(_) => StatusCode::BAD_REQUEST,
            CourtDataError::Conflict(_) => StatusCode::CONFLICT,
            CourtDataError::FatalLookup(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CourtDataError::Contract(_) | CourtDataError::System { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "code": self.code(), "message": self.to_string() }));
        (status, body).into_response()
    }
}

pub(crate) fn transaction_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(LAA_TRANSACTION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
}

pub(crate) fn blocking_failure(error: tokio::task::JoinError) -> Response {
    tracing::error!(%error, "blocking court data task failed");
    CourtDataError::System {
        operation: "request handling",
    }
    .into_response()
}
