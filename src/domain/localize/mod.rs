//! Localization of fact text into the caller's language.
//!
//! Remote translation is tried first; on failure (error, timeout, or an
//! unchanged answer) the fixed term dictionary is applied to the original
//! English text. Localization never fails a request: the worst case is the
//! English text plus a recorded [`Degradation`].

pub mod dictionary;

use crate::domain::model::language::DEFAULT_LANGUAGE;
use crate::domain::model::LanguageCode;
use crate::error::Degradation;
use async_trait::async_trait;
use dictionary::TermDictionary;
use std::sync::Arc;
use std::time::Duration;

/// Remote translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> anyhow::Result<String>;
}

/// Which path produced the localized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalizationPath {
    /// Target is the source language; nothing to do.
    Identity,
    Remote,
    Dictionary,
    /// Every path failed; the text is the original English.
    Untranslated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Localized {
    pub text: String,
    pub path: LocalizationPath,
    pub degradation: Option<Degradation>,
}

pub struct LocalizationEngine {
    translator: Option<Arc<dyn Translator>>,
    timeout: Duration,
}

impl LocalizationEngine {
    pub fn new(translator: Option<Arc<dyn Translator>>, timeout: Duration) -> Self {
        Self {
            translator,
            timeout,
        }
    }

    /// Dictionary-only engine (no remote service).
    pub fn offline() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub async fn localize(&self, text: &str, target: &LanguageCode) -> Localized {
        if target.is_default() || text.trim().is_empty() {
            return Localized {
                text: text.to_string(),
                path: LocalizationPath::Identity,
                degradation: None,
            };
        }

        let remote_failure = match self.translate_remote(text, target).await {
            Ok(translated) => {
                return Localized {
                    text: translated,
                    path: LocalizationPath::Remote,
                    degradation: None,
                }
            }
            Err(degradation) => degradation,
        };

        tracing::warn!(
            language = %target,
            degradation = %remote_failure,
            cause = remote_failure.detail().unwrap_or("timeout"),
            "Remote translation unavailable, falling back to term dictionary"
        );

        match TermDictionary::for_language(target.primary()) {
            Some(dict) if dict.is_localized(text) => Localized {
                text: text.to_string(),
                path: LocalizationPath::Dictionary,
                degradation: Some(remote_failure),
            },
            Some(dict) => match dict.substitute(text) {
                Some(substituted) => Localized {
                    text: substituted,
                    path: LocalizationPath::Dictionary,
                    degradation: Some(remote_failure),
                },
                None => untranslated(text, remote_failure),
            },
            None => untranslated(text, remote_failure),
        }
    }

    async fn translate_remote(
        &self,
        text: &str,
        target: &LanguageCode,
    ) -> Result<String, Degradation> {
        let translator = self.translator.as_ref().ok_or_else(|| {
            Degradation::TranslationDegraded("no translation service configured".to_string())
        })?;

        let call = translator.translate(text, DEFAULT_LANGUAGE, target.primary());
        match tokio::time::timeout(self.timeout, call).await {
            Err(_) => Err(Degradation::TranslationTimeout),
            Ok(Err(e)) => Err(Degradation::TranslationDegraded(format!(
                "translation service failed: {:#}",
                e
            ))),
            Ok(Ok(translated)) => {
                let translated = translated.trim();
                if translated.is_empty() || translated == text.trim() {
                    Err(Degradation::TranslationDegraded(
                        "translation service returned the text unchanged".to_string(),
                    ))
                } else {
                    Ok(translated.to_string())
                }
            }
        }
    }
}

fn untranslated(text: &str, cause: Degradation) -> Localized {
    Localized {
        text: text.to_string(),
        path: LocalizationPath::Untranslated,
        degradation: Some(cause),
    }
}
