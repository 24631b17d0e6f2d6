//! HTTP handlers for dashboard reporting

use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::AppResult;
use crate::services::reporting::{DashboardStats, ReportingService};
use crate::AppState;

/// Dashboard headline numbers
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let service = ReportingService::new(state.db);
    let stats = service
        .dashboard(
            Utc::now().date_naive(),
            state.config.alerts.expiry_window_days,
        )
        .await?;
    Ok(Json(stats))
}
