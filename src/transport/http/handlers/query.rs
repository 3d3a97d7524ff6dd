use crate::domain::model::QueryPayload;
use crate::transport::http::handlers::common::query_error;
use crate::transport::http::types::{json_422, AppState, QueryResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[utoipa::path(
    post,
    path = "/query",
    request_body = QueryPayload,
    responses(
        (status = 200, description = "Fact text, with narration when available", body = QueryResponse),
        (status = 400, description = "Missing field or unknown query type", body = QueryResponse),
        (status = 404, description = "Product not found", body = QueryResponse),
        (status = 422, description = "Body is not valid JSON", body = QueryResponse),
        (status = 500, description = "Internal server error", body = QueryResponse)
    )
)]
pub async fn query_handler(
    State(state): State<AppState>,
    request: Result<Json<QueryPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(
                e,
                r#"{"product_name": string, "query_type": "nutrition|allergen|price", "language"?: string}"#,
            )
            .into_response()
        }
    };

    match state.query_service.answer(payload).await {
        Ok(result) => (StatusCode::OK, Json(QueryResponse::from(result))).into_response(),
        Err(e) => query_error(e),
    }
}
