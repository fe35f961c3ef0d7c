use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use stockfolio_backend::app;
use stockfolio_backend::config::{AppConfig, StoreBackend};
use stockfolio_backend::external::price_feed::PriceFeed;
use stockfolio_backend::external::yahoo::YahooPriceFeed;
use stockfolio_backend::logging::{self, LoggingConfig};
use stockfolio_backend::state::AppState;
use stockfolio_backend::store::{InMemoryTransactionStore, PgTransactionStore, TransactionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env();
    config.validate().map_err(anyhow::Error::msg)?;

    let store: Arc<dyn TransactionStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await
                .context("Failed to connect to Postgres")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("🗄️ Using Postgres transaction store");
            Arc::new(PgTransactionStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::info!("🗄️ Using in-memory transaction store");
            Arc::new(InMemoryTransactionStore::new())
        }
    };

    let price_feed: Arc<dyn PriceFeed> = match config.price_feed_url.as_deref() {
        Some(url) => Arc::new(YahooPriceFeed::with_base_url(url)),
        None => Arc::new(YahooPriceFeed::new()),
    };

    let state = AppState::new(store, price_feed, config.price_lookup_options());
    let app = app::create_app(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("🚀 Stockfolio backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
