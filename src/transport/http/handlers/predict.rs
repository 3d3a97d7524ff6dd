use crate::error::Error;
use crate::transport::http::handlers::common::{predict_error, predict_status};
use crate::transport::http::types::{AppState, PredictResponse, PredictUpload};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

const IMAGE_FIELD: &str = "image";

#[utoipa::path(
    post,
    path = "/predict",
    request_body(content = PredictUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image classified", body = PredictResponse),
        (status = 400, description = "No image provided", body = PredictResponse),
        (status = 413, description = "Image too large", body = PredictResponse),
        (status = 500, description = "Classification backend reported an error", body = PredictResponse),
        (status = 503, description = "Classification backend unavailable", body = PredictResponse)
    )
)]
pub async fn predict_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            return predict_error(Error::Validation(format!(
                "expected multipart/form-data with an '{}' field: {}",
                IMAGE_FIELD,
                e.body_text()
            )))
        }
    };

    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(IMAGE_FIELD) => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((bytes, content_type));
                        break;
                    }
                    Err(e) => return predict_status(e.status(), e.body_text()),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return predict_status(e.status(), e.body_text()),
        }
    }

    let Some((image, content_type)) = upload else {
        return predict_status(StatusCode::BAD_REQUEST, "No image file provided");
    };

    tracing::info!(bytes = image.len(), content_type = %content_type, "Received image for classification");

    match state.classifier.classify(&image, &content_type).await {
        Ok(classification) => {
            let product_name = state
                .query_service
                .resolver()
                .canonical_name(&classification.label)
                .map(str::to_string);
            (
                StatusCode::OK,
                Json(PredictResponse::classified(classification, product_name)),
            )
                .into_response()
        }
        Err(e) => predict_error(e),
    }
}
