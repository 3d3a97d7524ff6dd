use crate::error::Error;
use crate::transport::http::types::{PredictResponse, QueryResponse};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Logs a failed request at a level matching who is at fault. Internal faults
/// are logged in full; callers only ever see `Error::public_message`.
pub fn log_failure(endpoint: &str, err: &Error) {
    if err.is_internal() {
        tracing::error!(endpoint, error = ?err, "Request failed with an internal error");
    } else if err.status_code().is_server_error() {
        tracing::warn!(endpoint, error = %err, "Request failed upstream");
    } else {
        tracing::info!(endpoint, error = %err, "Request rejected");
    }
}

pub fn predict_error(err: Error) -> Response {
    log_failure("/predict", &err);
    (err.status_code(), Json(PredictResponse::failure(err.public_message()))).into_response()
}

pub fn query_error(err: Error) -> Response {
    log_failure("/query", &err);
    (err.status_code(), Json(QueryResponse::failure(err.public_message()))).into_response()
}

pub fn predict_status(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(PredictResponse::failure(message))).into_response()
}
