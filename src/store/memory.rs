use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::errors::AppError;
use crate::models::{ForecastFilter, ForecastRecord, NewForecast};
use crate::store::ForecastStore;

/// Process-local store. Inserts take the write lock, so each append is atomic.
#[derive(Clone, Default)]
pub struct MemoryForecastStore {
    records: Arc<RwLock<Vec<ForecastRecord>>>,
}

impl MemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ForecastStore for MemoryForecastStore {
    async fn insert(&self, forecast: NewForecast) -> Result<ForecastRecord, AppError> {
        let record = ForecastRecord::new(forecast);
        self.records.write().push(record.clone());
        Ok(record)
    }

    async fn query(&self, filter: &ForecastFilter) -> Result<Vec<ForecastRecord>, AppError> {
        let records = self.records.read();
        Ok(records
            .iter()
            .rev()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.records.read().len() as u64)
    }
}
