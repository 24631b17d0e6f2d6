//! Reorder queue: accepted purchase requests and their procurement status
//!
//! At most one `pending` entry exists per medicine. Enqueueing again merges
//! into it instead of inserting a duplicate.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{ReorderQueueEntry, ReorderStatus, Severity};
use crate::services::InventoryService;

const LOW_STOCK_REASON: &str = "Low stock auto-reorder";

#[derive(Clone)]
pub struct ReorderQueueService {
    db: SqlitePool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EnqueueReorderInput {
    pub medicine_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i64,
    #[validate(length(min = 1, max = 200))]
    pub reason: String,
    pub priority: Severity,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReorderStatusInput {
    pub status: ReorderStatus,
}

#[derive(Debug, FromRow)]
struct ReorderRow {
    id: Uuid,
    medicine_id: Uuid,
    quantity: i64,
    reason: String,
    priority: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReorderRow> for ReorderQueueEntry {
    type Error = AppError;

    fn try_from(row: ReorderRow) -> Result<Self, Self::Error> {
        let priority = Severity::parse(&row.priority)
            .ok_or_else(|| AppError::Internal(format!("Unknown priority '{}'", row.priority)))?;
        let status = ReorderStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown reorder status '{}'", row.status)))?;

        Ok(ReorderQueueEntry {
            id: row.id,
            medicine_id: row.medicine_id,
            quantity: row.quantity,
            reason: row.reason,
            priority,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ENTRY_COLUMNS: &str =
    "id, medicine_id, quantity, reason, priority, status, created_at, updated_at";

impl ReorderQueueService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Queue a reorder, merging into the medicine's pending entry if one exists
    pub async fn enqueue(&self, input: EnqueueReorderInput) -> AppResult<ReorderQueueEntry> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let entry = Self::enqueue_in(
            &mut tx,
            input.medicine_id,
            input.quantity,
            &input.reason,
            input.priority,
        )
        .await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Enqueue on an existing connection; the caller owns the transaction
    pub(crate) async fn enqueue_in(
        conn: &mut SqliteConnection,
        medicine_id: Uuid,
        quantity: i64,
        reason: &str,
        priority: Severity,
    ) -> AppResult<ReorderQueueEntry> {
        let now = Utc::now();
        let sql = format!(
            "SELECT {} FROM reorder_queue WHERE medicine_id = ? AND status = 'pending'",
            ENTRY_COLUMNS
        );
        let pending = sqlx::query_as::<_, ReorderRow>(&sql)
            .bind(medicine_id)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(row) = pending {
            let mut entry = ReorderQueueEntry::try_from(row)?;
            entry.quantity = entry.quantity.max(quantity);
            entry.priority = entry.priority.max(priority);
            entry.updated_at = now;

            sqlx::query(
                "UPDATE reorder_queue SET quantity = ?, priority = ?, updated_at = ? WHERE id = ?",
            )
            .bind(entry.quantity)
            .bind(entry.priority.as_str())
            .bind(now)
            .bind(entry.id)
            .execute(&mut *conn)
            .await?;

            tracing::debug!(
                reorder_id = %entry.id,
                medicine_id = %medicine_id,
                quantity = entry.quantity,
                "Merged into pending reorder"
            );
            return Ok(entry);
        }

        let entry = ReorderQueueEntry {
            id: Uuid::new_v4(),
            medicine_id,
            quantity,
            reason: reason.to_string(),
            priority,
            status: ReorderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO reorder_queue (id, medicine_id, quantity, reason, priority, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id)
        .bind(entry.medicine_id)
        .bind(entry.quantity)
        .bind(&entry.reason)
        .bind(entry.priority.as_str())
        .bind(entry.status.as_str())
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.message().contains("FOREIGN KEY") => {
                AppError::NotFound("Medicine".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        tracing::info!(
            reorder_id = %entry.id,
            medicine_id = %medicine_id,
            quantity,
            priority = priority.as_str(),
            "Reorder queued"
        );

        Ok(entry)
    }

    /// Queue entries, optionally filtered by status; highest priority first
    pub async fn list(&self, status: Option<ReorderStatus>) -> AppResult<Vec<ReorderQueueEntry>> {
        let sql = format!(
            "SELECT {} FROM reorder_queue \
             WHERE (?1 IS NULL OR status = ?1) \
             ORDER BY CASE priority WHEN 'HIGH' THEN 0 WHEN 'MEDIUM' THEN 1 ELSE 2 END, created_at",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, ReorderRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(ReorderQueueEntry::try_from).collect()
    }

    /// Queue every medicine at or below its minimum, topped up by `buffer` units
    pub async fn queue_low_stock(&self, buffer: i64) -> AppResult<Vec<ReorderQueueEntry>> {
        let mut tx = self.db.begin().await?;

        let low = sqlx::query_as::<_, (Uuid, i64, i64)>(
            r#"
            SELECT id, quantity, min_quantity
            FROM medicines
            WHERE quantity <= min_quantity
            ORDER BY brand_name
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut queued = Vec::with_capacity(low.len());
        for (medicine_id, quantity, min_quantity) in low {
            let shortage = (min_quantity - quantity + buffer).max(1);
            let entry = Self::enqueue_in(
                &mut tx,
                medicine_id,
                shortage,
                LOW_STOCK_REASON,
                Severity::Medium,
            )
            .await?;
            queued.push(entry);
        }

        tx.commit().await?;

        tracing::info!(count = queued.len(), buffer, "Low stock medicines queued for reorder");
        Ok(queued)
    }

    /// Advance an entry through procurement. Receiving adds the units to stock.
    pub async fn update_status(
        &self,
        id: Uuid,
        next: ReorderStatus,
    ) -> AppResult<ReorderQueueEntry> {
        let mut tx = self.db.begin().await?;

        let sql = format!("SELECT {} FROM reorder_queue WHERE id = ?", ENTRY_COLUMNS);
        let row = sqlx::query_as::<_, ReorderRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Reorder".to_string()))?;
        let mut entry = ReorderQueueEntry::try_from(row)?;

        if !entry.status.can_transition_to(next) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move reorder from {} to {}",
                entry.status, next
            )));
        }

        let now = Utc::now();
        sqlx::query("UPDATE reorder_queue SET status = ?, updated_at = ? WHERE id = ?")
            .bind(next.as_str())
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if next == ReorderStatus::Received {
            InventoryService::add_stock(&mut tx, entry.medicine_id, entry.quantity, now).await?;
        }

        tx.commit().await?;

        tracing::info!(
            reorder_id = %id,
            from = entry.status.as_str(),
            to = next.as_str(),
            "Reorder status updated"
        );

        entry.status = next;
        entry.updated_at = now;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::MedicineCategory;
    use crate::services::inventory::tests::medicine_input;

    async fn setup() -> (InventoryService, ReorderQueueService) {
        let pool = test_pool().await;
        (InventoryService::new(pool.clone()), ReorderQueueService::new(pool))
    }

    fn request(medicine_id: Uuid, quantity: i64, priority: Severity) -> EnqueueReorderInput {
        EnqueueReorderInput {
            medicine_id,
            quantity,
            reason: "Manual".to_string(),
            priority,
        }
    }

    #[tokio::test]
    async fn test_enqueue_merges_pending_entry() {
        let (inventory, queue) = setup().await;
        let medicine = inventory
            .create_medicine(medicine_input("Januvia 100mg", MedicineCategory::Diabetic, 5, 20, 80))
            .await
            .unwrap();

        let first = queue.enqueue(request(medicine.id, 40, Severity::Medium)).await.unwrap();
        let second = queue.enqueue(request(medicine.id, 25, Severity::High)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 40);
        assert_eq!(second.priority, Severity::High);

        let pending = queue.list(Some(ReorderStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].quantity, 40);
        assert_eq!(pending[0].priority, Severity::High);
    }

    #[tokio::test]
    async fn test_enqueue_unknown_medicine() {
        let (_, queue) = setup().await;
        let result = queue.enqueue(request(Uuid::new_v4(), 10, Severity::Low)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_queue_low_stock_uses_buffer() {
        let (inventory, queue) = setup().await;
        inventory
            .create_medicine(medicine_input("Low", MedicineCategory::Other, 15, 20, 100))
            .await
            .unwrap();
        inventory
            .create_medicine(medicine_input("Fine", MedicineCategory::Other, 80, 20, 100))
            .await
            .unwrap();

        let queued = queue.queue_low_stock(20).await.unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].quantity, 25);
        assert_eq!(queued[0].priority, Severity::Medium);

        // Second run merges rather than duplicating
        queue.queue_low_stock(20).await.unwrap();
        assert_eq!(queue.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_receiving_adds_stock() {
        let (inventory, queue) = setup().await;
        let medicine = inventory
            .create_medicine(medicine_input("Azithral 500mg", MedicineCategory::Antibiotic, 10, 25, 120))
            .await
            .unwrap();
        let entry = queue.enqueue(request(medicine.id, 50, Severity::High)).await.unwrap();

        queue.update_status(entry.id, ReorderStatus::Ordered).await.unwrap();
        let received = queue.update_status(entry.id, ReorderStatus::Received).await.unwrap();
        assert_eq!(received.status, ReorderStatus::Received);

        assert_eq!(inventory.get_medicine(medicine.id).await.unwrap().quantity, 60);
    }

    #[tokio::test]
    async fn test_invalid_transitions_are_rejected() {
        let (inventory, queue) = setup().await;
        let medicine = inventory
            .create_medicine(medicine_input("Cyclopam", MedicineCategory::Gastrointestinal, 10, 45, 220))
            .await
            .unwrap();
        let entry = queue.enqueue(request(medicine.id, 30, Severity::Medium)).await.unwrap();

        let err = queue
            .update_status(entry.id, ReorderStatus::Received)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));

        queue.update_status(entry.id, ReorderStatus::Cancelled).await.unwrap();
        let err = queue
            .update_status(entry.id, ReorderStatus::Ordered)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));

        assert_eq!(inventory.get_medicine(medicine.id).await.unwrap().quantity, 10);
    }
}
