//! The query orchestrator.
//!
//! One call walks `VALIDATE -> RESOLVE_LABEL -> LOOKUP_FACT -> LOCALIZE -> SYNTHESIZE`.
//! Only validation and lookup can fail the request; localization and narration
//! degrade into warnings on an otherwise successful result.

use crate::domain::label::{LabelMapping, LabelResolver};
use crate::domain::localize::{LocalizationEngine, Translator};
use crate::domain::model::{QueryPayload, QueryRequest, QueryResult};
use crate::domain::narration::{NarrationEngine, SpeechSynthesizer};
use crate::error::{Degradation, Result};
use crate::infra::config::Config;
use crate::infra::speech::{DisabledSynthesizer, HttpSpeechSynthesizer};
use crate::infra::translator::HttpTranslator;
use crate::storage::fact_store::FactStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

const SPEECH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct QueryService {
    resolver: LabelResolver,
    store: FactStore,
    localizer: LocalizationEngine,
    narrator: Arc<NarrationEngine>,
}

impl QueryService {
    pub fn new(
        resolver: LabelResolver,
        store: FactStore,
        localizer: LocalizationEngine,
        narrator: Arc<NarrationEngine>,
    ) -> Self {
        Self {
            resolver,
            store,
            localizer,
            narrator,
        }
    }

    /// Wires the pipeline from configuration: label mapping file, optional
    /// remote translator and optional remote speech service.
    pub async fn from_config(config: &Config, store: FactStore) -> anyhow::Result<Self> {
        let mapping = match &config.label_mapping_path {
            Some(path) => {
                let mapping = LabelMapping::load_from_file(path)?;
                tracing::info!(labels = mapping.len(), path = %path.display(), "Loaded label mapping");
                mapping
            }
            None => LabelMapping::new(),
        };

        let translator: Option<Arc<dyn Translator>> = match &config.translator_url {
            Some(url) => Some(Arc::new(HttpTranslator::new(
                url.clone(),
                config.translator_api_key.clone(),
                config.translator_timeout,
            )?)),
            None => {
                tracing::info!("TRANSLATOR_URL not set, using the built-in dictionary only");
                None
            }
        };

        let synthesizer: Box<dyn SpeechSynthesizer> = match &config.tts_url {
            Some(url) => Box::new(HttpSpeechSynthesizer::new(url, SPEECH_TIMEOUT)?),
            None => {
                tracing::warn!("TTS_URL not set, answers will be text-only");
                Box::new(DisabledSynthesizer)
            }
        };
        let narrator = NarrationEngine::new(synthesizer, config.static_root.clone()).await?;

        Ok(Self::new(
            LabelResolver::new(mapping),
            store,
            LocalizationEngine::new(translator, config.translator_timeout),
            Arc::new(narrator),
        ))
    }

    pub fn resolver(&self) -> &LabelResolver {
        &self.resolver
    }

    pub fn store(&self) -> &FactStore {
        &self.store
    }

    pub fn narrator(&self) -> &Arc<NarrationEngine> {
        &self.narrator
    }

    /// Validates a raw payload and answers it.
    pub async fn answer(&self, payload: QueryPayload) -> Result<QueryResult> {
        let request = QueryRequest::try_from(payload)?;
        self.answer_request(request).await
    }

    pub async fn answer_request(&self, request: QueryRequest) -> Result<QueryResult> {
        let span = tracing::info_span!(
            "query",
            product = %request.product_name_or_label,
            query_type = %request.query_type,
            language = %request.language,
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: QueryRequest) -> Result<QueryResult> {
        let resolution = self.resolver.resolve(&request.product_name_or_label);
        tracing::debug!(key = %resolution.display_name(), source = ?resolution.source, "Resolved label");

        let row = self.store.lookup(&resolution.key, request.query_type).await?;
        let product_name = row.product().name.clone();
        let detail = row.detail_text();
        tracing::debug!(product = %product_name, "Fact found");

        let mut warnings = Vec::new();
        let localized = self.localizer.localize(&detail, &request.language).await;
        tracing::debug!(path = ?localized.path, "Localized fact text");
        if let Some(degradation) = localized.degradation {
            warnings.push(degradation);
        }

        let (audio_reference, error) = match self
            .narrator
            .synthesize(&localized.text, &product_name, request.query_type, &request.language)
            .await
        {
            Ok(artifact) => {
                tracing::debug!(uri = %artifact.uri, cached = artifact.cached, "Narration ready");
                (Some(artifact.uri), None)
            }
            Err(e) => {
                let cause = format!("{:#}", e);
                tracing::warn!(error = %cause, "Narration failed, answering with text only");
                warnings.push(Degradation::NarrationDegraded(cause));
                (None, Some("Audio narration is unavailable; returning text only".to_string()))
            }
        };

        tracing::info!(
            product = %product_name,
            audio = audio_reference.is_some(),
            warnings = warnings.len(),
            "Query answered"
        );

        Ok(QueryResult {
            success: true,
            detail_text: localized.text,
            audio_reference,
            resolved_product_name: product_name,
            language: request.language,
            error,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::LanguageCode;
    use crate::domain::narration::Voice;
    use crate::error::Error;
    use crate::storage::seed;
    use async_trait::async_trait;

    struct BeepSynth;

    #[async_trait]
    impl SpeechSynthesizer for BeepSynth {
        async fn voices(&self) -> anyhow::Result<Vec<Voice>> {
            Ok(Vec::new())
        }

        async fn synthesize(
            &mut self,
            _text: &str,
            _voice: Option<&Voice>,
            _language: &LanguageCode,
        ) -> anyhow::Result<Vec<u8>> {
            Ok(b"beep".to_vec())
        }
    }

    async fn service(
        synth: Box<dyn SpeechSynthesizer>,
        root: &std::path::Path,
    ) -> QueryService {
        let store = FactStore::connect("sqlite::memory:").await.unwrap();
        seed::ensure_schema(store.pool()).await.unwrap();
        seed::load_demo_catalogue(store.pool()).await.unwrap();
        let narrator = NarrationEngine::new(synth, root).await.unwrap();
        QueryService::new(
            LabelResolver::new(LabelMapping::new()),
            store,
            LocalizationEngine::offline(),
            Arc::new(narrator),
        )
    }

    fn payload(product: &str, query_type: &str, language: Option<&str>) -> QueryPayload {
        QueryPayload {
            product_name: Some(product.to_string()),
            query_type: Some(query_type.to_string()),
            language: language.map(String::from),
        }
    }

    #[tokio::test]
    async fn ordinal_label_answers_with_audio() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Box::new(BeepSynth), dir.path()).await;

        let result = svc.answer(payload("product-c", "price", None)).await.unwrap();
        assert!(result.success);
        assert_eq!(result.detail_text, "Price: $2.12");
        assert_eq!(result.resolved_product_name, "Morton Coarse Kosher Salt");
        assert_eq!(
            result.audio_reference.as_deref(),
            Some("/static/morton_coarse_kosher_salt_price_en.wav")
        );
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn unknown_query_type_fails_before_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Box::new(BeepSynth), dir.path()).await;
        let err = svc
            .answer(payload("product-a", "ingredients", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidQueryType(_)));
    }

    #[tokio::test]
    async fn narration_failure_degrades_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(Box::new(DisabledSynthesizer), dir.path()).await;

        let result = svc
            .answer(payload("Kroger Extra Virgin Olive Oil", "allergen", Some("en")))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(
            result.detail_text,
            "Allergen Information: free from common allergens"
        );
        assert!(result.audio_reference.is_none());
        assert!(result.error.is_some());
        assert!(matches!(
            result.warnings.as_slice(),
            [Degradation::NarrationDegraded(_)]
        ));
    }
}
