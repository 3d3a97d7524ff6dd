//! Classification gateway: forwards an uploaded image to the inference backend.
//!
//! Transient failures (connection errors, timeouts, HTTP 429/500/502/503/504)
//! are retried up to the policy's attempt cap with exponential backoff. Every
//! attempt uses a fresh connection (`Connection: close`, no idle pool) so a
//! backend restart never leaves us writing into a stale socket.

use crate::error::{Error, Result};
use crate::infra::config::{Config, RetryPolicy};
use rand::Rng;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("product-insight/", env!("CARGO_PKG_VERSION"));
const IMAGE_FIELD: &str = "image";
const MAX_BACKOFF_DOUBLINGS: u32 = 6;

/// Normalised classifier answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: String,
    pub confidence: Option<f64>,
}

/// The backend's `{success, prediction, error?}` envelope.
#[derive(Debug, Deserialize)]
struct PredictEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

enum Attempt {
    Success(Classification),
    Retryable {
        reason: String,
        /// Error message from a 500 envelope, reported if this turns out to be the last attempt.
        backend_error: Option<String>,
    },
    Fatal(Error),
}

pub struct ClassifierGateway {
    client: reqwest::Client,
    endpoint: Option<String>,
    policy: RetryPolicy,
    max_payload: usize,
}

impl ClassifierGateway {
    pub fn new(endpoint: Option<String>, policy: RetryPolicy, max_payload: usize) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(0)
            .timeout(policy.attempt_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            policy,
            max_payload,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.classifier_url.clone(),
            config.retry.clone(),
            config.max_upload_bytes,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Classifies one image. Fails with `PayloadTooLarge`/`Validation` before any
    /// network call, `BackendUnavailable` when the backend cannot be reached within
    /// the retry budget, or `BackendRejected` when it answers with its own error.
    pub async fn classify(&self, image: &[u8], content_type: &str) -> Result<Classification> {
        if image.is_empty() {
            return Err(Error::Validation("image payload is empty".to_string()));
        }
        if image.len() > self.max_payload {
            return Err(Error::PayloadTooLarge {
                size: image.len(),
                limit: self.max_payload,
            });
        }
        let endpoint = self.endpoint.as_deref().ok_or_else(|| {
            Error::BackendUnavailable("no classification backend configured".to_string())
        })?;

        let content_type = match content_type.trim() {
            "" => "application/octet-stream",
            ct => ct,
        };

        tracing::debug!(
            bytes = image.len(),
            content_type,
            "Forwarding image to classification backend"
        );

        let total = self.policy.total_timeout;
        match tokio::time::timeout(total, self.classify_with_retry(endpoint, image, content_type)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(timeout_ms = total.as_millis() as u64, "Classification deadline exceeded");
                Err(Error::BackendUnavailable(format!(
                    "no answer within {} ms",
                    total.as_millis()
                )))
            }
        }
    }

    async fn classify_with_retry(
        &self,
        endpoint: &str,
        image: &[u8],
        content_type: &str,
    ) -> Result<Classification> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_reason = String::new();
        let mut last_backend_error = None;

        for attempt in 1..=max_attempts {
            match self.attempt(endpoint, image, content_type).await {
                Attempt::Success(classification) => {
                    tracing::info!(
                        label = %classification.label,
                        confidence = classification.confidence,
                        attempt,
                        "Classification succeeded"
                    );
                    return Ok(classification);
                }
                Attempt::Fatal(err) => {
                    tracing::warn!(attempt, error = %err, "Classification failed (not retryable)");
                    return Err(err);
                }
                Attempt::Retryable {
                    reason,
                    backend_error,
                } => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        reason = %reason,
                        "Transient classification failure"
                    );
                    last_reason = reason;
                    last_backend_error = backend_error;
                    if attempt < max_attempts {
                        tokio::time::sleep(self.backoff(attempt)).await;
                    }
                }
            }
        }

        match last_backend_error {
            Some(message) => Err(Error::BackendRejected(message)),
            None => Err(Error::BackendUnavailable(format!(
                "{} (after {} attempts)",
                last_reason, max_attempts
            ))),
        }
    }

    async fn attempt(&self, endpoint: &str, image: &[u8], content_type: &str) -> Attempt {
        let part = match reqwest::multipart::Part::bytes(image.to_vec())
            .file_name(upload_file_name(content_type))
            .mime_str(content_type)
        {
            Ok(p) => p,
            Err(e) => {
                return Attempt::Fatal(Error::Validation(format!(
                    "invalid image content type {:?}: {}",
                    content_type, e
                )))
            }
        };
        let form = reqwest::multipart::Form::new().part(IMAGE_FIELD, part);

        let response = match self
            .client
            .post(endpoint)
            .header(reqwest::header::CONNECTION, "close")
            .multipart(form)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_builder() => {
                return Attempt::Fatal(Error::Internal(anyhow::anyhow!(
                    "invalid classification request: {}",
                    e
                )))
            }
            Err(e) => {
                return Attempt::Retryable {
                    reason: format!("request failed: {}", e),
                    backend_error: None,
                }
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                return Attempt::Retryable {
                    reason: format!("failed to read response body: {}", e),
                    backend_error: None,
                }
            }
        };
        let envelope = serde_json::from_str::<PredictEnvelope>(&body).ok();

        if status.is_success() {
            return match envelope {
                Some(env) if env.success => match env.prediction.filter(|p| !p.trim().is_empty()) {
                    Some(label) => Attempt::Success(Classification {
                        label: label.trim().to_string(),
                        confidence: env.confidence,
                    }),
                    None => Attempt::Fatal(Error::BackendRejected(
                        "backend reported success without a prediction".to_string(),
                    )),
                },
                Some(env) => Attempt::Fatal(Error::BackendRejected(
                    env.error
                        .unwrap_or_else(|| "backend reported failure".to_string()),
                )),
                None => Attempt::Fatal(Error::BackendRejected(
                    "backend returned an unreadable response".to_string(),
                )),
            };
        }

        let backend_error = envelope.and_then(|e| e.error);
        if is_transient(status) {
            return Attempt::Retryable {
                reason: format!("backend answered HTTP {}", status.as_u16()),
                backend_error: if status == StatusCode::INTERNAL_SERVER_ERROR {
                    backend_error
                } else {
                    None
                },
            };
        }

        if backend_error.is_none() {
            tracing::warn!(
                status = status.as_u16(),
                body = %snippet(&body),
                "Classification backend rejected the request without an error envelope"
            );
        }
        Attempt::Fatal(Error::BackendRejected(backend_error.unwrap_or_else(|| {
            format!("backend answered HTTP {}", status.as_u16())
        })))
    }

    /// Delay after failed attempt `attempt` (1-based): `base * 2^(attempt-1)` plus up to 25% jitter.
    fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(MAX_BACKOFF_DOUBLINGS);
        let base = self
            .policy
            .base_backoff
            .checked_mul(2u32.pow(doublings))
            .unwrap_or(Duration::MAX);
        let jitter_ms = u64::try_from(base.as_millis() / 4).unwrap_or(u64::MAX);
        if jitter_ms == 0 {
            return base;
        }
        base.saturating_add(Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms)))
    }

    /// Reachability check against the backend root (`GET /`).
    pub async fn ping(&self) -> anyhow::Result<StatusCode> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("CLASSIFIER_URL is not set"))?;
        let root = reqwest::Url::parse(endpoint)?.join("/")?;
        let response = self
            .client
            .get(root)
            .header(reqwest::header::CONNECTION, "close")
            .send()
            .await?;
        Ok(response.status())
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn upload_file_name(content_type: &str) -> String {
    let ext = match content_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        _ => "bin",
    };
    format!("upload.{}", ext)
}

fn snippet(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
