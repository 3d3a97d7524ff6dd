use crate::app::QueryService;
use crate::domain::model::QueryResult;
use crate::infra::classifier::{Classification, ClassifierGateway};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub query_service: Arc<QueryService>,
    pub classifier: Arc<ClassifierGateway>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(query_service: Arc<QueryService>, classifier: Arc<ClassifierGateway>) -> Self {
        Self {
            query_service,
            classifier,
            started_at: Utc::now(),
        }
    }
}

/// Multipart body accepted by `POST /predict`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct PredictUpload {
    /// Product photo (JPEG, PNG, ...)
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Canonical product name when the label maps onto one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn classified(classification: Classification, product_name: Option<String>) -> Self {
        Self {
            success: true,
            prediction: Some(classification.label),
            confidence: classification.confidence,
            product_name,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            prediction: None,
            confidence: None,
            product_name: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Non-fatal degradations, e.g. `NarrationDegraded: ...`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            details: None,
            audio_url: None,
            product_name: None,
            language: None,
            warnings: Vec::new(),
            error: Some(message.into()),
        }
    }
}

impl From<QueryResult> for QueryResponse {
    fn from(result: QueryResult) -> Self {
        Self {
            success: result.success,
            details: Some(result.detail_text),
            audio_url: result.audio_reference,
            product_name: Some(result.resolved_product_name),
            language: Some(result.language.to_string()),
            warnings: result.warnings.iter().map(ToString::to_string).collect(),
            error: result.error,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ServiceDescriptor {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_secs: i64,
    /// `"METHOD /path"` -> description
    #[schema(value_type = Object)]
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<QueryResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(QueryResponse::failure(format!(
            "Invalid JSON body: {} (expected: {})",
            err.body_text(),
            expected
        ))),
    )
}
