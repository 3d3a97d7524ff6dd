//! Label resolution: raw classifier label -> product key for the fact store.
//!
//! Resolution order:
//! 1. exact, case-insensitive lookup in the [`LabelMapping`];
//! 2. `product-<letter>` labels become a direct identity key (see [`ordinal`]);
//! 3. anything else passes through unchanged as a best-effort product name.
//!
//! The resolver never fails. A key that matches nothing is the fact store's
//! `ProductNotFound`, not a resolver error.

pub mod ordinal;

use crate::domain::model::ProductKey;
use anyhow::Context;
use ordinal::OrdinalLabel;
use std::collections::HashMap;
use std::path::Path;

pub use ordinal::{letter_to_ordinal, ordinal_to_letter};

/// Raw classifier label -> canonical product name. Not guaranteed total.
#[derive(Debug, Clone, Default)]
pub struct LabelMapping {
    entries: HashMap<String, String>,
}

impl LabelMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a mapping; the label is normalised so lookups are case-insensitive.
    pub fn insert(&mut self, label: &str, canonical_name: impl Into<String>) {
        self.entries
            .insert(normalize_label(label), canonical_name.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(&normalize_label(label)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads a JSON object of `{ "raw label": "Canonical Name" }`.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let raw: HashMap<String, String> =
            serde_json::from_str(json).context("label mapping must be a JSON object of strings")?;
        let mut mapping = Self::new();
        for (label, name) in raw {
            let name = name.trim();
            if label.trim().is_empty() || name.is_empty() {
                continue;
            }
            mapping.insert(&label, name);
        }
        Ok(mapping)
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read label mapping {}", path.display()))?;
        Self::from_json_str(&content)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for LabelMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (label, name) in iter {
            mapping.insert(label.as_ref(), name);
        }
        mapping
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Which rule produced a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Mapped,
    Ordinal,
    PassThrough,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: ProductKey,
    pub source: ResolutionSource,
}

impl Resolution {
    /// Best name to show before the fact store has confirmed the product.
    pub fn display_name(&self) -> String {
        match (&self.key, self.source) {
            (ProductKey::Id(id), ResolutionSource::Ordinal) => u32::try_from(*id)
                .ok()
                .and_then(ordinal::ordinal_label)
                .map(|label| format!("{} ({})", label, self.key))
                .unwrap_or_else(|| self.key.to_string()),
            _ => self.key.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LabelResolver {
    mapping: LabelMapping,
}

impl LabelResolver {
    pub fn new(mapping: LabelMapping) -> Self {
        Self { mapping }
    }

    pub fn resolve(&self, raw_label: &str) -> Resolution {
        let label = raw_label.trim();

        if let Some(name) = self.mapping.get(label) {
            return Resolution {
                key: ProductKey::Name(name.to_string()),
                source: ResolutionSource::Mapped,
            };
        }

        if let Some(ordinal) = OrdinalLabel::parse(label) {
            return Resolution {
                key: ProductKey::Id(i64::from(ordinal.ordinal())),
                source: ResolutionSource::Ordinal,
            };
        }

        Resolution {
            key: ProductKey::Name(label.to_string()),
            source: ResolutionSource::PassThrough,
        }
    }

    /// Canonical name for a raw label when the mapping knows it.
    pub fn canonical_name(&self, raw_label: &str) -> Option<&str> {
        self.mapping.get(raw_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LabelResolver {
        LabelResolver::new(LabelMapping::from_iter([
            ("Product-B", "Great Value Twist and Shout Cookies"),
            ("pb_jar", "Kroger Creamy Peanut Butter"),
        ]))
    }

    #[test]
    fn mapping_wins_and_is_case_insensitive() {
        let r = resolver().resolve("PRODUCT-b");
        assert_eq!(r.source, ResolutionSource::Mapped);
        assert_eq!(
            r.key,
            ProductKey::Name("Great Value Twist and Shout Cookies".to_string())
        );
    }

    #[test]
    fn unmapped_ordinal_labels_become_identity_keys() {
        let r = resolver().resolve("product-c");
        assert_eq!(r.source, ResolutionSource::Ordinal);
        assert_eq!(r.key, ProductKey::Id(3));
        assert_eq!(r.display_name(), "product-c (#3)");
    }

    #[test]
    fn everything_else_passes_through() {
        let r = resolver().resolve("  Morton Coarse Kosher Salt ");
        assert_eq!(r.source, ResolutionSource::PassThrough);
        assert_eq!(
            r.key,
            ProductKey::Name("Morton Coarse Kosher Salt".to_string())
        );
        assert_eq!(r.display_name(), "Morton Coarse Kosher Salt");
    }

    #[test]
    fn loads_mapping_from_json() {
        let mapping = LabelMapping::from_json_str(
            r#"{"product-a": "Kroger Creamy Peanut Butter", "blank": "  "}"#,
        )
        .unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping.get("PRODUCT-A"),
            Some("Kroger Creamy Peanut Butter")
        );
        assert!(LabelMapping::from_json_str("[1, 2]").is_err());
    }
}
