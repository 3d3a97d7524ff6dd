//! Deterministic naming of narration artifacts.
//!
//! One artifact exists per (product, query type, language). Repeated requests
//! overwrite it in place rather than accumulating timestamped copies.

use crate::domain::model::{LanguageCode, QueryType};

const SEPARATOR: char = '_';
const FALLBACK_STEM: &str = "product";

/// Lowercases and collapses every run of non-alphanumeric characters into one separator.
pub fn sanitize(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut pending_separator = false;

    for ch in component.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push(SEPARATOR);
            }
            pending_separator = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    stem: String,
}

impl ArtifactName {
    pub fn new(product_name: &str, query_type: QueryType, language: &LanguageCode) -> Self {
        let product = sanitize(product_name);
        let product = if product.is_empty() {
            FALLBACK_STEM.to_string()
        } else {
            product
        };
        let stem = format!(
            "{}{sep}{}{sep}{}",
            product,
            query_type.as_str(),
            sanitize(language.as_str()),
            sep = SEPARATOR
        );
        Self { stem }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.stem, extension)
    }

    /// Sidecar holding the fingerprint of the audio currently on disk.
    pub fn fingerprint_file_name(&self, extension: &str) -> String {
        format!("{}.{}.sha256", self.stem, extension)
    }
}
