use crate::transport::http::types::{AppState, ServiceDescriptor};
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use std::collections::BTreeMap;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service descriptor", body = ServiceDescriptor)
    )
)]
pub async fn index_handler(State(state): State<AppState>) -> Json<ServiceDescriptor> {
    let endpoints: BTreeMap<String, String> = [
        ("POST /predict", "Classify a product photo (multipart form field `image`)"),
        ("POST /query", "Product facts as text and narration (JSON {product_name, query_type, language})"),
        ("GET /static/<file>", "Generated narration audio"),
        ("GET /health", "Fact store readiness"),
        ("GET /swagger-ui", "API documentation"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Json(ServiceDescriptor {
        status: "API is running".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        endpoints,
    })
}
