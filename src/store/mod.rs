use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{ForecastFilter, ForecastRecord, NewForecast};

mod memory;
mod postgres;

pub use memory::MemoryForecastStore;
pub use postgres::PgForecastStore;

/// Append-only forecast storage. There is intentionally no update or delete.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    /// Appends one record atomically. The store assigns `id` and `submitted_at`.
    async fn insert(&self, forecast: NewForecast) -> Result<ForecastRecord, AppError>;

    /// All records matching `filter`, in no particular order.
    async fn query(&self, filter: &ForecastFilter) -> Result<Vec<ForecastRecord>, AppError>;

    async fn count(&self) -> Result<u64, AppError>;
}
