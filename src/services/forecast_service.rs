use std::ops::RangeInclusive;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{
    AccessTier, CreateForecast, Distribution, ForecastFilter, ForecastMetadata, ForecastRecord,
    NewForecast,
};
use crate::services::forecast_parser::{self, ParsedForecast};
use crate::services::{csv_export_service, distribution_service};
use crate::store::ForecastStore;

/// Start years outside this range are accepted but logged.
pub const PLAUSIBLE_START_YEARS: RangeInclusive<i32> = 1990..=2100;

/// Business rules applied to a successfully parsed forecast before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPolicy {
    pub min_years: usize,
    /// Longer forecasts are rejected, never truncated.
    pub max_years: Option<usize>,
    pub require_contiguous_years: bool,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            min_years: 1,
            max_years: None,
            require_contiguous_years: true,
        }
    }
}

impl SubmissionPolicy {
    pub fn validate(&self, parsed: &ParsedForecast) -> Result<(), AppError> {
        let years = parsed.revenues.len();

        if years < self.min_years {
            return Err(AppError::Validation(format!(
                "Forecast must cover at least {} years, got {}",
                self.min_years, years
            )));
        }

        if let Some(max) = self.max_years {
            if years > max {
                return Err(AppError::Validation(format!(
                    "Forecast may cover at most {} years, got {}",
                    max, years
                )));
            }
        }

        if !parsed.is_contiguous() {
            if self.require_contiguous_years {
                return Err(AppError::Validation(
                    "Years must be consecutive (e.g. 2025, 2026, 2027)".to_string(),
                ));
            }
            warn!(
                "Accepting forecast with non-consecutive years {:?}; revenues are aligned from {}",
                parsed.years, parsed.start_year
            );
        }

        if !PLAUSIBLE_START_YEARS.contains(&parsed.start_year) {
            warn!("Forecast start year {} looks implausible", parsed.start_year);
        }

        Ok(())
    }
}

/// Parses and validates a submission without touching the store.
pub fn prepare_submission(
    policy: &SubmissionPolicy,
    input: CreateForecast,
    access: AccessTier,
) -> Result<NewForecast, AppError> {
    if !input.system_size.is_finite() || input.system_size < 0.0 {
        return Err(AppError::Validation(
            "System size must be a non-negative number of MWh".to_string(),
        ));
    }

    let parsed = forecast_parser::parse_pasted_forecast(&input.pasted_data)?;
    policy.validate(&parsed)?;

    Ok(NewForecast {
        start_year: parsed.start_year,
        revenues: parsed.revenues,
        metadata: ForecastMetadata {
            system_size: input.system_size,
            location: input.location,
            battery_chemistry: input.battery_chemistry,
            use_case: input.use_case,
            premium: access.is_premium(),
        },
    })
}

pub async fn submit(
    store: &dyn ForecastStore,
    policy: &SubmissionPolicy,
    input: CreateForecast,
    access: AccessTier,
) -> Result<ForecastRecord, AppError> {
    let forecast = prepare_submission(policy, input, access).map_err(|e| {
        warn!("Rejected forecast submission: {}", e);
        e
    })?;

    let record = store.insert(forecast).await?;
    info!(
        "Stored forecast {} ({} years from {})",
        record.id,
        record.revenues.len(),
        record.start_year
    );
    Ok(record)
}

/// Free viewers always see the whole ensemble; only premium access narrows it.
pub fn effective_filter(filter: ForecastFilter, access: AccessTier) -> ForecastFilter {
    if access.is_premium() {
        filter
    } else {
        ForecastFilter::default()
    }
}

pub async fn list(
    store: &dyn ForecastStore,
    filter: ForecastFilter,
    access: AccessTier,
) -> Result<Vec<ForecastRecord>, AppError> {
    let filter = effective_filter(filter, access);
    store.query(&filter).await
}

pub async fn distribution(
    store: &dyn ForecastStore,
    filter: ForecastFilter,
    access: AccessTier,
) -> Result<Distribution, AppError> {
    let records = list(store, filter, access).await?;
    let distribution = distribution_service::distribution(&records);
    if distribution.is_empty() {
        info!("No forecasts available for the selected filters");
    }
    Ok(distribution)
}

pub async fn export_csv(
    store: &dyn ForecastStore,
    filter: ForecastFilter,
    access: AccessTier,
) -> Result<String, AppError> {
    if !access.is_premium() {
        return Err(AppError::Unauthorized);
    }
    let records = list(store, filter, access).await?;
    csv_export_service::export_csv(&records)
}
