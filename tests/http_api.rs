//! HTTP surface tests driven through the router with `oneshot`.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use async_trait::async_trait;
use common::{query_service, EchoSynth};
use product_insight::domain::label::LabelMapping;
use product_insight::domain::model::LanguageCode;
use product_insight::domain::narration::{SpeechSynthesizer, Voice};
use product_insight::infra::config::RetryPolicy;
use product_insight::transport::http::{create_router, AppState};
use product_insight::ClassifierGateway;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "X-PRODUCT-INSIGHT-BOUNDARY";

/// Speech backend whose failures carry internal paths and credentials.
struct CrashingSynth;

#[async_trait]
impl SpeechSynthesizer for CrashingSynth {
    async fn voices(&self) -> anyhow::Result<Vec<Voice>> {
        Ok(Vec::new())
    }

    async fn synthesize(
        &mut self,
        _text: &str,
        _voice: Option<&Voice>,
        _language: &LanguageCode,
    ) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("worker /opt/tts/engine.py crashed with db_password=hunter2")
    }
}

async fn setup_app(static_root: &Path, classifier_url: Option<String>) -> axum::Router {
    setup_app_with(Box::new(EchoSynth::default()), static_root, classifier_url).await
}

async fn setup_app_with(
    synth: Box<dyn SpeechSynthesizer>,
    static_root: &Path,
    classifier_url: Option<String>,
) -> axum::Router {
    let mapping =
        LabelMapping::from_json_str(r#"{"product-a": "Kroger Creamy Peanut Butter"}"#).unwrap();
    let service = query_service(synth, static_root, mapping).await;
    let policy = RetryPolicy {
        base_backoff: Duration::from_millis(5),
        ..RetryPolicy::default()
    };
    let classifier = ClassifierGateway::new(classifier_url, policy, 64 * 1024).unwrap();
    create_router(AppState::new(Arc::new(service), Arc::new(classifier)))
}

fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"shelf.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n",
            b = BOUNDARY,
            f = field
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn index_describes_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), None).await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "API is running");
    assert!(body["endpoints"]["POST /predict"].is_string());
    assert!(body["endpoints"]["POST /query"].is_string());
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), None).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await["status"], "ok");
}

#[tokio::test]
async fn query_returns_details_and_serves_audio() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), None).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/query",
            r#"{"product_name": "product-c", "query_type": "price", "language": "en"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["details"], "Price: $2.12");
    assert_eq!(body["product_name"], "Morton Coarse Kosher Salt");
    assert_eq!(body["language"], "en");
    assert!(body.get("warnings").is_none());
    assert!(body.get("error").is_none());

    let audio_url = body["audio_url"].as_str().unwrap().to_string();
    assert_eq!(audio_url, "/static/morton_coarse_kosher_salt_price_en.wav");

    let response = app
        .oneshot(Request::builder().uri(&audio_url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let audio = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&audio[..], b"en-1:Price: $2.12");
}

#[tokio::test]
async fn static_mount_hides_fingerprints_and_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), None).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/query",
            r#"{"product_name": "product-a", "query_type": "allergen"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let audio_url = body["audio_url"].as_str().unwrap().to_string();

    let sidecar = dir
        .path()
        .join("kroger_creamy_peanut_butter_allergen_en.wav.sha256");
    assert!(sidecar.exists());
    std::fs::write(
        dir.path().join("kroger_creamy_peanut_butter_allergen_en.wav.tmp"),
        b"partial",
    )
    .unwrap();

    for hidden in [
        format!("{}.sha256", audio_url),
        format!("{}.tmp", audio_url),
    ] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(&hidden).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", hidden);
    }

    let response = app
        .oneshot(Request::builder().uri(&audio_url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn narration_failures_do_not_leak_backend_detail() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app_with(Box::new(CrashingSynth), dir.path(), None).await;

    let response = app
        .oneshot(json_request(
            "/query",
            r#"{"product_name": "product-c", "query_type": "price"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let raw = String::from_utf8_lossy(&bytes);
    assert!(!raw.contains("hunter2"));
    assert!(!raw.contains("/opt/tts"));

    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["details"], "Price: $2.12");
    assert!(body.get("audio_url").is_none());
    assert_eq!(
        body["warnings"],
        json!(["NarrationDegraded: speech synthesis unavailable"])
    );
}

#[tokio::test]
async fn query_reports_degradations_as_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), None).await;

    let response = app
        .oneshot(json_request(
            "/query",
            r#"{"product_name": "Kroger Extra Virgin Olive Oil", "query_type": "price", "language": "es"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["details"], "Precio: $2.12");
    let warnings = body["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().starts_with("TranslationDegraded"));
}

#[tokio::test]
async fn query_validation_errors_are_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), None).await;

    let response = app
        .clone()
        .oneshot(json_request("/query", r#"{"product_name": "product-a"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("query_type"));

    let response = app
        .oneshot(json_request(
            "/query",
            r#"{"product_name": "product-a", "query_type": "ingredients"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_product_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), None).await;

    let response = app
        .oneshot(json_request(
            "/query",
            r#"{"product_name": "Mystery Jam", "query_type": "nutrition"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Mystery Jam"));
}

#[tokio::test]
async fn malformed_json_is_422() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), None).await;

    let response = app
        .oneshot(json_request("/query", r#"{"product_name": "product-a", "#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn predict_without_image_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), None).await;

    let response = app
        .oneshot(multipart_request("photo", b"not the right field"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No image file provided");
}

#[tokio::test]
async fn predict_without_backend_is_503() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), None).await;

    let response = app.oneshot(multipart_request("image", &[0xFF, 0xD8, 0xFF])).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Classification backend unavailable, try again later"
    );
}

#[tokio::test]
async fn predict_forwards_to_backend_and_maps_label() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "prediction": "product-a", "confidence": 0.93 })),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), Some(format!("{}/predict", server.uri()))).await;

    let response = app.oneshot(multipart_request("image", &[0xFF, 0xD8, 0xFF])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["prediction"], "product-a");
    assert_eq!(body["confidence"], 0.93);
    assert_eq!(body["product_name"], "Kroger Creamy Peanut Butter");
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path(), Some("http://127.0.0.1:9/predict".to_string())).await;

    let response = app
        .oneshot(multipart_request("image", &vec![0u8; 64 * 1024 + 1]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
}
