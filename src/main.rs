use std::sync::Arc;

use anyhow::{anyhow, Context};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use bess_forecast_backend::app;
use bess_forecast_backend::config::{AppConfig, StoreBackend};
use bess_forecast_backend::logging::{init_logging, LoggingConfig};
use bess_forecast_backend::state::AppState;
use bess_forecast_backend::store::{ForecastStore, MemoryForecastStore, PgForecastStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env()).map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let store: Arc<dyn ForecastStore> = match config.store {
        StoreBackend::Postgres => {
            let db = config
                .database
                .as_ref()
                .context("Postgres backend selected without database settings")?;
            let pool = PgPoolOptions::new()
                .max_connections(db.max_connections)
                .acquire_timeout(db.acquire_timeout)
                .connect(&db.url)
                .await
                .context("Failed to connect to Postgres")?;

            let store = PgForecastStore::new(pool);
            store
                .ensure_schema()
                .await
                .map_err(|e| anyhow!("Failed to create forecasts table: {}", e))?;
            tracing::info!("🗄️ Using Postgres forecast store");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("🧪 Using in-memory forecast store; submissions are lost on restart");
            Arc::new(MemoryForecastStore::new())
        }
    };

    tracing::info!("📐 Submission policy: {:?}", config.submission);

    let state = AppState {
        store,
        submission_policy: config.submission.clone(),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("🚀 BESS forecast backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
