//! HTTP handlers for billing and sales history

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::sales::{Bill, CreateBillInput, DailyRevenue, DaySales, SalesService, TopSeller};
use crate::AppState;
use shared::types::DateRange;

const DEFAULT_TOP_SELLERS: usize = 10;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub limit: Option<usize>,
}

impl RangeQuery {
    fn range(&self) -> AppResult<DateRange> {
        if self.start > self.end {
            return Err(AppError::validation("start", "Start date must not be after end date"));
        }
        Ok(DateRange::new(self.start, self.end))
    }
}

/// Bill a counter sale
pub async fn create_bill(
    State(state): State<AppState>,
    Json(input): Json<CreateBillInput>,
) -> AppResult<(StatusCode, Json<Bill>)> {
    let service = SalesService::new(state.db);
    let bill = service.create_bill(input).await?;
    Ok((StatusCode::CREATED, Json(bill)))
}

/// All sale lines on a date with the day's summary
pub async fn sales_on(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<DaySales>> {
    let service = SalesService::new(state.db);
    let day = service.sales_on(date).await?;
    Ok(Json(day))
}

/// Daily revenue across a date range
pub async fn sales_trend(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<DailyRevenue>>> {
    let range = query.range()?;
    let service = SalesService::new(state.db);
    let trend = service.sales_trend(range).await?;
    Ok(Json(trend))
}

/// Best sellers across a date range
pub async fn top_selling(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<TopSeller>>> {
    let range = query.range()?;
    let service = SalesService::new(state.db);
    let sellers = service
        .top_selling(range, query.limit.unwrap_or(DEFAULT_TOP_SELLERS))
        .await?;
    Ok(Json(sellers))
}
