use crate::domain::model::QueryPayload;
use crate::domain::narration::STATIC_URL_PREFIX;
use crate::transport::http::handlers::{health, index, predict, query};
use crate::transport::http::types::{
    AppState, HealthResponse, PredictResponse, PredictUpload, QueryResponse, ServiceDescriptor,
};
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for multipart boundaries and part headers on top of the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        index::index_handler,
        health::healthcheck_handler,
        predict::predict_handler,
        query::query_handler
    ),
    components(schemas(
        QueryPayload,
        QueryResponse,
        PredictUpload,
        PredictResponse,
        ServiceDescriptor,
        HealthResponse
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    let upload_limit = app_state.classifier.max_payload() + MULTIPART_OVERHEAD;
    let narrator = app_state.query_service.narrator();
    let static_files = Router::new()
        .nest_service(STATIC_URL_PREFIX, ServeDir::new(narrator.static_root()))
        .layer(middleware::from_fn_with_state(
            narrator.extension(),
            only_audio_files,
        ));

    Router::new()
        .route("/", get(index::index_handler))
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/predict",
            post(predict::predict_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/query", post(query::query_handler))
        .with_state(app_state)
        .merge(static_files)
        .layer(TraceLayer::new_for_http())
}

/// Fingerprint sidecars and in-flight temp files share the static root; only
/// finished audio is served.
async fn only_audio_files(
    State(extension): State<&'static str>,
    request: Request,
    next: Next,
) -> Response {
    if !is_audio_file(request.uri().path(), extension) {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}

fn is_audio_file(path: &str, extension: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or_default();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && !stem.starts_with('.') && ext == extension,
        None => false,
    }
}
