#![allow(dead_code)]

use async_trait::async_trait;
use product_insight::domain::label::{LabelMapping, LabelResolver};
use product_insight::domain::localize::LocalizationEngine;
use product_insight::domain::model::LanguageCode;
use product_insight::domain::narration::{NarrationEngine, SpeechSynthesizer, Voice};
use product_insight::storage::seed;
use product_insight::{FactStore, QueryService};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub async fn seeded_store() -> FactStore {
    let store = FactStore::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    seed::ensure_schema(store.pool()).await.expect("schema");
    seed::load_demo_catalogue(store.pool()).await.expect("seed");
    store
}

/// Synthesizer that "speaks" the text back as bytes and counts calls.
#[derive(Default)]
pub struct EchoSynth {
    pub calls: Arc<AtomicUsize>,
}

impl EchoSynth {
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for EchoSynth {
    async fn voices(&self) -> anyhow::Result<Vec<Voice>> {
        Ok(vec![
            Voice {
                id: "en-1".to_string(),
                name: "Samantha (English)".to_string(),
                languages: vec!["en-US".to_string()],
            },
            Voice {
                id: "es-1".to_string(),
                name: "Monica (Spanish)".to_string(),
                languages: vec!["es-ES".to_string()],
            },
        ])
    }

    async fn synthesize(
        &mut self,
        text: &str,
        voice: Option<&Voice>,
        _language: &LanguageCode,
    ) -> anyhow::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let voice = voice.map(|v| v.id.as_str()).unwrap_or("default");
        Ok(format!("{}:{}", voice, text).into_bytes())
    }
}

pub struct BrokenSynth;

#[async_trait]
impl SpeechSynthesizer for BrokenSynth {
    async fn voices(&self) -> anyhow::Result<Vec<Voice>> {
        anyhow::bail!("voice listing unavailable")
    }

    async fn synthesize(
        &mut self,
        _text: &str,
        _voice: Option<&Voice>,
        _language: &LanguageCode,
    ) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("audio device lost")
    }
}

pub async fn query_service(
    synth: Box<dyn SpeechSynthesizer>,
    static_root: &Path,
    mapping: LabelMapping,
) -> QueryService {
    let narrator = NarrationEngine::new(synth, static_root)
        .await
        .expect("narration engine");
    QueryService::new(
        LabelResolver::new(mapping),
        seeded_store().await,
        LocalizationEngine::offline(),
        Arc::new(narrator),
    )
}
