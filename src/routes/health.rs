use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub forecast_count: u64,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    info!("GET /health - Health check");
    let forecast_count = state.store.count().await.map_err(|e| {
        error!("Health check could not reach the forecast store: {}", e);
        e
    })?;
    Ok(Json(HealthResponse {
        status: "ok",
        forecast_count,
    }))
}
