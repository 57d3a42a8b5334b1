use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

use crate::db::forecast_queries::{self, ForecastRow};
use crate::errors::AppError;
use crate::models::{ForecastFilter, ForecastRecord, NewForecast};
use crate::store::ForecastStore;

/// PostgreSQL-backed store. Connections are taken from the pool per operation.
#[derive(Clone)]
pub struct PgForecastStore {
    pool: PgPool,
}

impl PgForecastStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `forecasts` table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        forecast_queries::create_schema(&self.pool).await?;
        Ok(())
    }
}

fn decode_row(row: ForecastRow) -> Result<ForecastRecord, AppError> {
    let id = row.id;
    ForecastRecord::try_from(row).map_err(|e| {
        error!("Stored forecast {} could not be decoded: {}", id, e);
        AppError::Storage(format!("forecast {}: {}", id, e))
    })
}

#[async_trait]
impl ForecastStore for PgForecastStore {
    async fn insert(&self, forecast: NewForecast) -> Result<ForecastRecord, AppError> {
        let record = ForecastRecord::new(forecast);
        let row = forecast_queries::insert(&self.pool, &record).await?;
        decode_row(row)
    }

    async fn query(&self, filter: &ForecastFilter) -> Result<Vec<ForecastRecord>, AppError> {
        forecast_queries::fetch_filtered(&self.pool, filter)
            .await?
            .into_iter()
            .map(decode_row)
            .collect()
    }

    async fn count(&self) -> Result<u64, AppError> {
        let count = forecast_queries::count(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
