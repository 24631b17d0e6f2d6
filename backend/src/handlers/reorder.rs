//! HTTP handlers for the reorder queue

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ReorderQueueEntry, ReorderStatus};
use crate::services::reorder_queue::{
    EnqueueReorderInput, ReorderQueueService, UpdateReorderStatusInput,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReorderListQuery {
    pub status: Option<ReorderStatus>,
}

/// List queued reorders
pub async fn list_reorders(
    State(state): State<AppState>,
    Query(query): Query<ReorderListQuery>,
) -> AppResult<Json<Vec<ReorderQueueEntry>>> {
    let service = ReorderQueueService::new(state.db);
    let entries = service.list(query.status).await?;
    Ok(Json(entries))
}

/// Accept a recommendation into the queue
pub async fn enqueue_reorder(
    State(state): State<AppState>,
    Json(input): Json<EnqueueReorderInput>,
) -> AppResult<(StatusCode, Json<ReorderQueueEntry>)> {
    let service = ReorderQueueService::new(state.db);
    let entry = service.enqueue(input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Queue every low-stock medicine
pub async fn queue_low_stock(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ReorderQueueEntry>>> {
    let service = ReorderQueueService::new(state.db);
    let entries = service
        .queue_low_stock(state.config.alerts.low_stock_buffer)
        .await?;
    Ok(Json(entries))
}

/// Move a reorder through procurement
pub async fn update_reorder_status(
    State(state): State<AppState>,
    Path(reorder_id): Path<Uuid>,
    Json(input): Json<UpdateReorderStatusInput>,
) -> AppResult<Json<ReorderQueueEntry>> {
    let service = ReorderQueueService::new(state.db);
    let entry = service.update_status(reorder_id, input.status).await?;
    Ok(Json(entry))
}
