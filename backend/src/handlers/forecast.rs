//! HTTP handlers for demand forecasts and reorder recommendations

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ForecastResult, ReorderRecommendation};
use crate::services::ForecastingService;
use crate::AppState;
use shared::validation::validate_forecast_horizon;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub months: Option<u32>,
}

fn forecasting_service(state: &AppState) -> ForecastingService {
    ForecastingService::new(
        state.db.clone(),
        state.forecast.clone(),
        state.reorder.clone(),
    )
}

/// Forecast demand for a medicine
pub async fn get_forecast(
    State(state): State<AppState>,
    Path(medicine_id): Path<Uuid>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<ForecastResult>> {
    let limits = &state.config.forecast_limits;
    let months = query.months.unwrap_or(limits.default_horizon_months);
    validate_forecast_horizon(months, limits.max_horizon_months)
        .map_err(|msg| AppError::validation("months", msg))?;

    let forecast = forecasting_service(&state)
        .forecast(medicine_id, months)
        .await?;
    Ok(Json(forecast))
}

/// Reorder recommendations for medicines near their minimum
pub async fn recommend_reorders(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ReorderRecommendation>>> {
    let recommendations = forecasting_service(&state).recommend_reorders().await?;
    Ok(Json(recommendations))
}
