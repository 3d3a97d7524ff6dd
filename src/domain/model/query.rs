use crate::domain::model::LanguageCode;
use crate::error::{Degradation, Error, Result};
use serde::Deserialize;
use utoipa::ToSchema;

/// The closed set of questions a caller can ask about a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Nutrition,
    Allergen,
    Price,
}

impl QueryType {
    pub const ALL: [QueryType; 3] = [QueryType::Nutrition, QueryType::Allergen, QueryType::Price];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Nutrition => "nutrition",
            QueryType::Allergen => "allergen",
            QueryType::Price => "price",
        }
    }
}

impl std::str::FromStr for QueryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase();
        QueryType::ALL
            .into_iter()
            .find(|qt| qt.as_str() == tag)
            .ok_or_else(|| {
                Error::InvalidQueryType(format!(
                    "\"{}\" (expected one of: nutrition, allergen, price)",
                    s.trim()
                ))
            })
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated query as it arrives on the wire.
#[derive(Deserialize, Debug, Clone, Default, ToSchema)]
pub struct QueryPayload {
    /// Canonical product name or raw classifier label (e.g. `product-a`).
    #[serde(default)]
    pub product_name: Option<String>,
    /// One of `nutrition`, `allergen`, `price`.
    #[serde(default)]
    pub query_type: Option<String>,
    /// ISO-639-1 style code; defaults to `en`.
    #[serde(default)]
    pub language: Option<String>,
}

/// A validated query, alive for the duration of one orchestration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub product_name_or_label: String,
    pub query_type: QueryType,
    pub language: LanguageCode,
}

impl QueryRequest {
    pub fn new(product: impl Into<String>, query_type: QueryType, language: LanguageCode) -> Self {
        Self {
            product_name_or_label: product.into(),
            query_type,
            language,
        }
    }
}

impl TryFrom<QueryPayload> for QueryRequest {
    type Error = Error;

    fn try_from(payload: QueryPayload) -> Result<Self> {
        let product = payload
            .product_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Validation("product_name is required".to_string()))?;
        let query_type = payload
            .query_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Validation("query_type is required".to_string()))?
            .parse::<QueryType>()?;
        let language = LanguageCode::parse(payload.language.as_deref())?;

        Ok(Self::new(product, query_type, language))
    }
}

/// Outcome of one orchestration call.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub success: bool,
    pub detail_text: String,
    pub audio_reference: Option<String>,
    pub resolved_product_name: String,
    pub language: LanguageCode,
    pub error: Option<String>,
    pub warnings: Vec<Degradation>,
}
