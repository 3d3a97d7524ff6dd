// Schema bootstrap and the demo catalogue used by local runs and tests.

use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        cost REAL NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS nutritional_info (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        product_id INTEGER NOT NULL UNIQUE REFERENCES products(id),
        calories INTEGER NOT NULL,
        total_fat TEXT NOT NULL,
        cholesterol TEXT NOT NULL,
        sodium TEXT NOT NULL,
        total_carbs TEXT NOT NULL,
        fiber TEXT NOT NULL,
        sugar TEXT NOT NULL,
        protein TEXT NOT NULL,
        allergy TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_products_name ON products (name COLLATE NOCASE)",
];

struct DemoProduct {
    id: i64,
    name: &'static str,
    cost: f64,
    calories: i64,
    total_fat: &'static str,
    cholesterol: &'static str,
    sodium: &'static str,
    total_carbs: &'static str,
    fiber: &'static str,
    sugar: &'static str,
    protein: &'static str,
    allergy: &'static str,
}

const DEMO_CATALOGUE: &[DemoProduct] = &[
    DemoProduct {
        id: 1,
        name: "Kroger Creamy Peanut Butter",
        cost: 6.49,
        calories: 180,
        total_fat: "15g",
        cholesterol: "0mg",
        sodium: "150mg",
        total_carbs: "7g",
        fiber: "2g",
        sugar: "4g",
        protein: "7g",
        allergy: "Peanuts",
    },
    DemoProduct {
        id: 2,
        name: "Great Value Twist and Shout Cookies",
        cost: 3.37,
        calories: 160,
        total_fat: "7g",
        cholesterol: "0mg",
        sodium: "160mg",
        total_carbs: "24g",
        fiber: "1g",
        sugar: "12g",
        protein: "2g",
        allergy: "Wheat and Soy. May contain traces of milk, eggs, almonds, coconut, pecans, and peanuts.",
    },
    DemoProduct {
        id: 3,
        name: "Morton Coarse Kosher Salt",
        cost: 2.12,
        calories: 0,
        total_fat: "0g",
        cholesterol: "0mg",
        sodium: "480mg",
        total_carbs: "0g",
        fiber: "0g",
        sugar: "0g",
        protein: "0g",
        allergy: "None",
    },
    DemoProduct {
        id: 4,
        name: "Kroger Extra Virgin Olive Oil",
        cost: 2.12,
        calories: 120,
        total_fat: "14g",
        cholesterol: "0mg",
        sodium: "0mg",
        total_carbs: "0g",
        fiber: "0g",
        sugar: "0g",
        protein: "0g",
        allergy: "None",
    },
];

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Inserts the four demo products when the catalogue is empty.
/// Returns how many products were written (0 if data was already present).
pub async fn load_demo_catalogue(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        tracing::debug!(existing, "Catalogue already populated, skipping demo seed");
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for product in DEMO_CATALOGUE {
        sqlx::query("INSERT INTO products (id, name, cost) VALUES (?, ?, ?)")
            .bind(product.id)
            .bind(product.name)
            .bind(product.cost)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO nutritional_info
                (product_id, calories, total_fat, cholesterol, sodium, total_carbs, fiber, sugar, protein, allergy)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(product.id)
        .bind(product.calories)
        .bind(product.total_fat)
        .bind(product.cholesterol)
        .bind(product.sodium)
        .bind(product.total_carbs)
        .bind(product.fiber)
        .bind(product.sugar)
        .bind(product.protein)
        .bind(product.allergy)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(products = DEMO_CATALOGUE.len(), "Seeded demo catalogue");
    Ok(DEMO_CATALOGUE.len())
}
