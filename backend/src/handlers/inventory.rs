//! HTTP handlers for the medicine catalogue and stock

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DailySales, Medicine};
use crate::services::inventory::{
    CreateMedicineInput, ExpiringMedicine, InventoryService, LowStockItem, ReceiveStockInput,
};
use crate::services::SalesService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub days: Option<i64>,
}

/// List medicines, optionally filtered by a search term
pub async fn list_medicines(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Medicine>>> {
    let service = InventoryService::new(state.db);
    let medicines = service.list_medicines(query.search.as_deref()).await?;
    Ok(Json(medicines))
}

/// Add a medicine to the catalogue
pub async fn create_medicine(
    State(state): State<AppState>,
    Json(input): Json<CreateMedicineInput>,
) -> AppResult<(StatusCode, Json<Medicine>)> {
    let service = InventoryService::new(state.db);
    let medicine = service.create_medicine(input).await?;
    Ok((StatusCode::CREATED, Json(medicine)))
}

/// Get a medicine by id
pub async fn get_medicine(
    State(state): State<AppState>,
    Path(medicine_id): Path<Uuid>,
) -> AppResult<Json<Medicine>> {
    let service = InventoryService::new(state.db);
    let medicine = service.get_medicine(medicine_id).await?;
    Ok(Json(medicine))
}

/// Receive stock from a supplier
pub async fn receive_stock(
    State(state): State<AppState>,
    Path(medicine_id): Path<Uuid>,
    Json(input): Json<ReceiveStockInput>,
) -> AppResult<Json<Medicine>> {
    let service = InventoryService::new(state.db);
    let medicine = service.receive_stock(medicine_id, input).await?;
    Ok(Json(medicine))
}

/// Units sold per day over the trailing window (default: the forecast history window)
pub async fn get_daily_sales(
    State(state): State<AppState>,
    Path(medicine_id): Path<Uuid>,
    Query(query): Query<DaysQuery>,
) -> AppResult<Json<Vec<DailySales>>> {
    let days = query.days.unwrap_or(state.forecast.history_window_days);
    if days < 0 {
        return Err(AppError::validation("days", "Days must not be negative"));
    }

    // 404 for unknown medicines rather than an empty series
    InventoryService::new(state.db.clone())
        .get_medicine(medicine_id)
        .await?;

    let today = Utc::now().date_naive();
    let service = SalesService::new(state.db);
    let history = service
        .daily_sales(medicine_id, today - Duration::days(days), today)
        .await?;
    Ok(Json(history))
}

/// Medicines at or below their minimum stock
pub async fn low_stock(State(state): State<AppState>) -> AppResult<Json<Vec<LowStockItem>>> {
    let service = InventoryService::new(state.db);
    let items = service.low_stock_medicines().await?;
    Ok(Json(items))
}

/// Medicines expiring within `days` (default: configured alert window)
pub async fn expiring(
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> AppResult<Json<Vec<ExpiringMedicine>>> {
    let days = query.days.unwrap_or(state.config.alerts.expiry_window_days);
    let service = InventoryService::new(state.db);
    let items = service
        .expiring_medicines(days, Utc::now().date_naive())
        .await?;
    Ok(Json(items))
}
