use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{AccessTier, CreateForecast, Distribution, ForecastFilter, ForecastRecord};
use crate::services::forecast_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_forecasts).post(submit_forecast))
        .route("/distribution", get(get_distribution))
        .route("/export", get(export_forecasts))
}

#[axum::debug_handler]
pub async fn submit_forecast(
    State(state): State<AppState>,
    access: AccessTier,
    Json(data): Json<CreateForecast>,
) -> Result<(StatusCode, Json<ForecastRecord>), AppError> {
    info!("POST /api/forecasts - Submitting forecast ({:?} access)", access);
    let record = forecast_service::submit(
        state.store.as_ref(),
        &state.submission_policy,
        data,
        access,
    )
    .await
    .map_err(|e| {
        error!("Failed to submit forecast: {}", e);
        e
    })?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_forecasts(
    State(state): State<AppState>,
    access: AccessTier,
    Query(filter): Query<ForecastFilter>,
) -> Result<Json<Vec<ForecastRecord>>, AppError> {
    info!("GET /api/forecasts - Listing forecasts with {:?}", filter);
    let records = forecast_service::list(state.store.as_ref(), filter, access)
        .await
        .map_err(|e| {
            error!("Failed to list forecasts: {}", e);
            e
        })?;
    Ok(Json(records))
}

pub async fn get_distribution(
    State(state): State<AppState>,
    access: AccessTier,
    Query(filter): Query<ForecastFilter>,
) -> Result<Json<Distribution>, AppError> {
    info!("GET /api/forecasts/distribution - Aggregating with {:?}", filter);
    let distribution = forecast_service::distribution(state.store.as_ref(), filter, access)
        .await
        .map_err(|e| {
            error!("Failed to compute distribution: {}", e);
            e
        })?;
    Ok(Json(distribution))
}

pub async fn export_forecasts(
    State(state): State<AppState>,
    access: AccessTier,
    Query(filter): Query<ForecastFilter>,
) -> Result<impl IntoResponse, AppError> {
    info!("GET /api/forecasts/export - Exporting CSV");
    let csv = forecast_service::export_csv(state.store.as_ref(), filter, access)
        .await
        .map_err(|e| {
            error!("Failed to export forecasts: {}", e);
            e
        })?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bess_forecasts.csv\"",
            ),
        ],
        csv,
    ))
}
