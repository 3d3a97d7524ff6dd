//! Narration engine: speech synthesis for localized fact text.
//!
//! The engine owns one synthesizer instance for the whole process. Synthesizers
//! are not safe to drive concurrently, so every call takes `&mut self` through
//! the engine's mutex and at most one synthesis is in flight at a time.

pub mod artifact;

use crate::crypto::hashing::narration_fingerprint;
use crate::domain::model::{LanguageCode, QueryType};
use anyhow::Context;
use artifact::ArtifactName;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub const STATIC_URL_PREFIX: &str = "/static";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// Text-to-speech backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Voices the backend offers. May be empty.
    async fn voices(&self) -> anyhow::Result<Vec<Voice>>;

    /// Renders `text`; `voice == None` means the backend's default voice.
    async fn synthesize(
        &mut self,
        text: &str,
        voice: Option<&Voice>,
        language: &LanguageCode,
    ) -> anyhow::Result<Vec<u8>>;

    fn file_extension(&self) -> &'static str {
        "wav"
    }
}

/// Picks a voice for `language`: exact tag, then primary subtag, then the
/// language's English name appearing in the voice name.
pub fn select_voice<'a>(voices: &'a [Voice], language: &LanguageCode) -> Option<&'a Voice> {
    let tag = language.as_str();
    let primary = language.primary();
    let normalized = |l: &String| l.trim().replace('_', "-").to_ascii_lowercase();

    voices
        .iter()
        .find(|v| v.languages.iter().any(|l| normalized(l) == tag))
        .or_else(|| {
            voices.iter().find(|v| {
                v.languages
                    .iter()
                    .any(|l| normalized(l).split('-').next() == Some(primary))
            })
        })
        .or_else(|| {
            let name = language.english_name()?;
            voices
                .iter()
                .find(|v| v.name.to_lowercase().contains(name))
        })
}

/// A generated (or reused) audio file under the static root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrationArtifact {
    pub file_name: String,
    pub uri: String,
    pub voice: Option<String>,
    pub generated_at: DateTime<Utc>,
    /// True when the existing file already matched and synthesis was skipped.
    pub cached: bool,
}

pub struct NarrationEngine {
    synthesizer: Mutex<Box<dyn SpeechSynthesizer>>,
    voices: Vec<Voice>,
    extension: &'static str,
    static_root: PathBuf,
}

impl NarrationEngine {
    /// Creates the engine and caches the backend's voice list. A voice listing
    /// failure is not fatal: the engine falls back to the default voice.
    pub async fn new(
        synthesizer: Box<dyn SpeechSynthesizer>,
        static_root: impl Into<PathBuf>,
    ) -> anyhow::Result<Self> {
        let static_root = static_root.into();
        tokio::fs::create_dir_all(&static_root)
            .await
            .with_context(|| format!("failed to create static root {}", static_root.display()))?;

        let voices = match synthesizer.voices().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list synthesizer voices, using default voice");
                Vec::new()
            }
        };
        tracing::info!(
            voices = voices.len(),
            static_root = %static_root.display(),
            "Narration engine ready"
        );

        Ok(Self {
            extension: synthesizer.file_extension(),
            synthesizer: Mutex::new(synthesizer),
            voices,
            static_root,
        })
    }

    /// Extension of every artifact this engine writes, without the dot.
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub fn static_root(&self) -> &Path {
        &self.static_root
    }

    /// Synthesizes `text` into the artifact for (product, query type, language).
    ///
    /// When the artifact on disk was produced from the same text and voice, it is
    /// reused without calling the synthesizer.
    pub async fn synthesize(
        &self,
        text: &str,
        product_name: &str,
        query_type: QueryType,
        language: &LanguageCode,
    ) -> anyhow::Result<NarrationArtifact> {
        let name = ArtifactName::new(product_name, query_type, language);
        let voice = select_voice(&self.voices, language);
        let fingerprint = narration_fingerprint(voice.map(|v| v.id.as_str()), language.as_str(), text);

        let file_name = name.file_name(self.extension);
        let audio_path = self.static_root.join(&file_name);
        let fingerprint_path = self
            .static_root
            .join(name.fingerprint_file_name(self.extension));

        // Held across the cache check, synthesis and file writes.
        let mut synthesizer = self.synthesizer.lock().await;

        let cached = is_current(&audio_path, &fingerprint_path, &fingerprint).await;
        if !cached {
            tracing::debug!(
                artifact = %file_name,
                voice = voice.map(|v| v.name.as_str()).unwrap_or("default"),
                "Synthesizing narration"
            );
            let audio = synthesizer
                .synthesize(text, voice, language)
                .await
                .context("speech synthesis failed")?;
            if audio.is_empty() {
                anyhow::bail!("speech synthesis produced no audio");
            }
            write_atomically(&audio_path, &audio).await?;
            write_atomically(&fingerprint_path, fingerprint.as_bytes()).await?;
        }
        drop(synthesizer);

        Ok(NarrationArtifact {
            uri: format!("{}/{}", STATIC_URL_PREFIX, file_name),
            file_name,
            voice: voice.map(|v| v.id.clone()),
            generated_at: Utc::now(),
            cached,
        })
    }
}

async fn is_current(audio_path: &Path, fingerprint_path: &Path, fingerprint: &str) -> bool {
    if !tokio::fs::try_exists(audio_path).await.unwrap_or(false) {
        return false;
    }
    match tokio::fs::read_to_string(fingerprint_path).await {
        Ok(stored) => stored.trim() == fingerprint,
        Err(_) => false,
    }
}

async fn write_atomically(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to move narration into {}", path.display()))?;
    Ok(())
}
