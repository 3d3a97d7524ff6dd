//! Read-only access to product identity, price and nutrition facts.
//!
//! Every lookup is a single parameterised query. Name matching is
//! case-insensitive on the trimmed name; a name that is a plain integer also
//! matches by identity, with name matches taking precedence.

use crate::domain::model::{FactRow, NutritionFact, ProductKey, ProductRecord, QueryType};
use crate::error::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.cost FROM products p";

const FACT_SELECT: &str = "SELECT p.id, p.name, p.cost, n.calories, n.total_fat, n.cholesterol, \
     n.sodium, n.total_carbs, n.fiber, n.sugar, n.protein, n.allergy \
     FROM products p JOIN nutritional_info n ON n.product_id = p.id";

const BY_ID: &str = " WHERE p.id = ?1 ORDER BY p.id LIMIT 1";

const BY_NAME_OR_ID: &str = " WHERE p.name = ?1 COLLATE NOCASE OR p.id = ?2 \
     ORDER BY CASE WHEN p.name = ?1 COLLATE NOCASE THEN 0 ELSE 1 END, p.id LIMIT 1";

#[derive(Clone)]
pub struct FactStore {
    pool: SqlitePool,
}

impl FactStore {
    /// Opens (creating if missing) the SQLite database at `database_url`.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to an in-memory database is a separate database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Finds the fact row answering `query_type` for `key`, or `ProductNotFound`.
    pub async fn lookup(&self, key: &ProductKey, query_type: QueryType) -> Result<FactRow> {
        let with_facts = !matches!(query_type, QueryType::Price);
        let select = if with_facts { FACT_SELECT } else { PRODUCT_SELECT };

        let row = match key {
            ProductKey::Id(id) => {
                sqlx::query(&format!("{}{}", select, BY_ID))
                    .bind(*id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            ProductKey::Name(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(Error::ProductNotFound("(empty name)".to_string()));
                }
                let as_id = name.parse::<i64>().ok();
                sqlx::query(&format!("{}{}", select, BY_NAME_OR_ID))
                    .bind(name)
                    .bind(as_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        let row = row.ok_or_else(|| Error::ProductNotFound(key.to_string()))?;
        let product = product_from_row(&row)?;

        Ok(match query_type {
            QueryType::Price => FactRow::Price { product },
            QueryType::Nutrition => FactRow::Nutrition {
                facts: nutrition_from_row(&row, product.id)?,
                product,
            },
            QueryType::Allergen => FactRow::Allergen {
                allergy: row.try_get("allergy")?,
                product,
            },
        })
    }

    /// Every product in identity order.
    pub async fn list_products(&self) -> Result<Vec<ProductRecord>> {
        let rows = sqlx::query(&format!("{} ORDER BY p.id", PRODUCT_SELECT))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(product_from_row).collect()
    }
}

fn product_from_row(row: &SqliteRow) -> Result<ProductRecord> {
    Ok(ProductRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        cost: row.try_get("cost")?,
    })
}

fn nutrition_from_row(row: &SqliteRow, product_id: i64) -> Result<NutritionFact> {
    Ok(NutritionFact {
        product_id,
        calories: row.try_get("calories")?,
        total_fat: row.try_get("total_fat")?,
        cholesterol: row.try_get("cholesterol")?,
        sodium: row.try_get("sodium")?,
        total_carbs: row.try_get("total_carbs")?,
        fiber: row.try_get("fiber")?,
        sugar: row.try_get("sugar")?,
        protein: row.try_get("protein")?,
        allergy: row.try_get("allergy")?,
    })
}
