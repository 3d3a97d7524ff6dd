//! Domain types shared by the resolution pipeline.

use serde::Serialize;

pub mod language;
pub mod query;

pub use language::LanguageCode;
pub use query::{QueryPayload, QueryRequest, QueryResult, QueryType};

/// A product row as stored by the fact store loader. Read-only to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub cost: f64,
}

/// One-to-one nutrition and allergen facts for a [`ProductRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionFact {
    pub product_id: i64,
    pub calories: i64,
    pub total_fat: String,
    pub cholesterol: String,
    pub sodium: String,
    pub total_carbs: String,
    pub fiber: String,
    pub sugar: String,
    pub protein: String,
    pub allergy: String,
}

/// How the fact store should find a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductKey {
    /// Canonical (or best-effort) product name, matched case-insensitively.
    Name(String),
    /// Direct identity key, bypassing name matching.
    Id(i64),
}

impl std::fmt::Display for ProductKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductKey::Name(name) => write!(f, "{}", name),
            ProductKey::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// A fact store answer, one variant per query type.
#[derive(Debug, Clone, PartialEq)]
pub enum FactRow {
    Nutrition {
        product: ProductRecord,
        facts: NutritionFact,
    },
    Allergen {
        product: ProductRecord,
        allergy: String,
    },
    Price {
        product: ProductRecord,
    },
}

impl FactRow {
    pub fn product(&self) -> &ProductRecord {
        match self {
            FactRow::Nutrition { product, .. }
            | FactRow::Allergen { product, .. }
            | FactRow::Price { product } => product,
        }
    }

    /// Renders the English fact sentence that gets localized and narrated.
    pub fn detail_text(&self) -> String {
        match self {
            FactRow::Nutrition { facts, .. } => format!(
                "Calories: {}, Total Fat: {}, Cholesterol: {}, Sodium: {}, Total Carbs: {}, Fiber: {}, Sugar: {}, Protein: {}",
                facts.calories,
                facts.total_fat,
                facts.cholesterol,
                facts.sodium,
                facts.total_carbs,
                facts.fiber,
                facts.sugar,
                facts.protein
            ),
            FactRow::Allergen { allergy, .. } => {
                let allergy = allergy.trim();
                if allergy.is_empty() || allergy.eq_ignore_ascii_case("none") {
                    "Allergen Information: free from common allergens".to_string()
                } else {
                    format!("Allergen Information: contains {}", allergy)
                }
            }
            FactRow::Price { product } => format!("Price: ${:.2}", product.cost),
        }
    }
}
