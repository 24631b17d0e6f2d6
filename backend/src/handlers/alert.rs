//! HTTP handlers for alerts

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Alert, EmergencyReport, Severity};
use crate::services::alert::{AlertService, CreateAlertInput};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AlertListQuery {
    pub severity: Option<Severity>,
}

/// List unresolved alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> AppResult<Json<Vec<Alert>>> {
    let service = AlertService::new(state.db);
    let alerts = service.list_unresolved(query.severity).await?;
    Ok(Json(alerts))
}

pub async fn create_alert(
    State(state): State<AppState>,
    Json(input): Json<CreateAlertInput>,
) -> AppResult<(StatusCode, Json<Alert>)> {
    let service = AlertService::new(state.db);
    let alert = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

pub async fn resolve_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = AlertService::new(state.db);
    service.resolve(alert_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Expired and out-of-stock medicines
pub async fn emergency_report(
    State(state): State<AppState>,
) -> AppResult<Json<EmergencyReport>> {
    let service = AlertService::new(state.db);
    let report = service.emergency_report(Utc::now().date_naive()).await?;
    Ok(Json(report))
}
