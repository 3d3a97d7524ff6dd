use crate::error::{Error, Result};
use serde::Serialize;

pub const DEFAULT_LANGUAGE: &str = "en";

/// A normalised ISO-639-1-like language tag such as `en`, `es` or `es-mx`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parses a caller-supplied tag. Missing or blank input means the default language.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Ok(Self::default());
        }

        let tag = raw.replace('_', "-").to_ascii_lowercase();
        let mut parts = tag.splitn(2, '-');
        let primary = parts.next().unwrap_or_default();
        let region = parts.next();

        let primary_ok =
            (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_alphabetic());
        let region_ok = region.map_or(true, |r| {
            (2..=8).contains(&r.len()) && r.chars().all(|c| c.is_ascii_alphanumeric())
        });

        if !primary_ok || !region_ok {
            return Err(Error::Validation(format!(
                "language must be an ISO-639-1 style code (e.g. \"en\", \"es\"), got \"{}\"",
                raw
            )));
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language without any region suffix (`es-mx` -> `es`).
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    pub fn is_default(&self) -> bool {
        self.primary() == DEFAULT_LANGUAGE
    }

    /// English name used for best-effort voice matching.
    pub fn english_name(&self) -> Option<&'static str> {
        let name = match self.primary() {
            "en" => "english",
            "es" => "spanish",
            "fr" => "french",
            "de" => "german",
            "it" => "italian",
            "pt" => "portuguese",
            "nl" => "dutch",
            "zh" => "chinese",
            "ja" => "japanese",
            "ko" => "korean",
            "ar" => "arabic",
            "hi" => "hindi",
            "ru" => "russian",
            _ => return None,
        };
        Some(name)
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGE.to_string())
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
