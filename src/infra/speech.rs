//! Speech synthesis backends.
//!
//! `HttpSpeechSynthesizer` talks to a remote speech service:
//! - `GET  {base}/voices`     -> `[{ "id", "name", "languages": [..] }]`
//! - `POST {base}/synthesize` -> `{ "audio_content": "<base64>" }`

use crate::domain::model::LanguageCode;
use crate::domain::narration::{SpeechSynthesizer, Voice};
use anyhow::Context;
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<&'a str>,
    language: &'a str,
    format: &'a str,
}

#[derive(Deserialize)]
struct SynthesizeResponse {
    audio_content: String,
}

pub struct HttpSpeechSynthesizer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSpeechSynthesizer {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn voices(&self) -> anyhow::Result<Vec<Voice>> {
        let response = self
            .client
            .get(format!("{}/voices", self.base_url))
            .send()
            .await
            .context("voice listing request failed")?
            .error_for_status()?;
        Ok(response.json().await.context("failed to parse voice list")?)
    }

    async fn synthesize(
        &mut self,
        text: &str,
        voice: Option<&Voice>,
        language: &LanguageCode,
    ) -> anyhow::Result<Vec<u8>> {
        let response = self
            .client
            .post(format!("{}/synthesize", self.base_url))
            .json(&SynthesizeRequest {
                text,
                voice: voice.map(|v| v.id.as_str()),
                language: language.as_str(),
                format: self.file_extension(),
            })
            .send()
            .await
            .context("synthesis request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("speech service returned {}: {}", status, body.trim());
        }

        let parsed: SynthesizeResponse = response
            .json()
            .await
            .context("failed to parse synthesis response")?;
        base64::engine::general_purpose::STANDARD
            .decode(parsed.audio_content.trim())
            .context("speech service returned invalid base64 audio")
    }
}

/// Stand-in for deployments without a speech service; every call fails so
/// requests degrade to text-only answers.
pub struct DisabledSynthesizer;

#[async_trait]
impl SpeechSynthesizer for DisabledSynthesizer {
    async fn voices(&self) -> anyhow::Result<Vec<Voice>> {
        Ok(Vec::new())
    }

    async fn synthesize(
        &mut self,
        _text: &str,
        _voice: Option<&Voice>,
        _language: &LanguageCode,
    ) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("speech synthesis is not configured (set TTS_URL)")
    }
}
