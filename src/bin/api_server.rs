// src/bin/api_server.rs

use axum::http::HeaderValue;
use product_insight::storage::seed;
use product_insight::transport;
use product_insight::{ClassifierGateway, Config, FactStore, QueryService};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_insight=info,api_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Fact Store ---
    tracing::info!(database_url = %config.database_url, "Opening fact store");
    let store = FactStore::connect(&config.database_url).await?;
    if config.seed_demo_data {
        seed::ensure_schema(store.pool()).await?;
        let inserted = seed::load_demo_catalogue(store.pool()).await?;
        tracing::info!(inserted, "Demo catalogue ready");
    }
    store.ping().await?;

    // --- Pipeline ---
    let classifier = ClassifierGateway::from_config(&config)?;
    if !classifier.is_configured() {
        tracing::warn!("CLASSIFIER_URL not set, /predict will answer 503");
    }
    let query_service = QueryService::from_config(&config, store).await?;

    let app_state = transport::http::AppState::new(Arc::new(query_service), Arc::new(classifier));

    // --- API Server ---
    let cors = match &config.cors_allow_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(HeaderValue::from_str(origin)?))
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "API server listening");
    tracing::info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received, draining connections");
        })
        .await?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}
