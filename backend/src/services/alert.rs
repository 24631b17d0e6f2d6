//! Stock and expiry alerts

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Alert, AlertType, EmergencyItem, EmergencyReport, Severity};

#[derive(Clone)]
pub struct AlertService {
    db: SqlitePool,
}

/// Input for raising an alert by hand
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAlertInput {
    pub medicine_id: Uuid,
    pub alert_type: AlertType,
    #[validate(length(min = 1, max = 500))]
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, FromRow)]
struct AlertRow {
    id: Uuid,
    medicine_id: Uuid,
    alert_type: String,
    message: String,
    severity: String,
    resolved: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = AppError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let alert_type = AlertType::parse(&row.alert_type)
            .ok_or_else(|| AppError::Internal(format!("Unknown alert type '{}'", row.alert_type)))?;
        let severity = Severity::parse(&row.severity)
            .ok_or_else(|| AppError::Internal(format!("Unknown severity '{}'", row.severity)))?;

        Ok(Alert {
            id: row.id,
            medicine_id: row.medicine_id,
            alert_type,
            message: row.message,
            severity,
            resolved: row.resolved,
            created_at: row.created_at,
        })
    }
}

impl AlertService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Raise an alert
    pub async fn create(&self, input: CreateAlertInput) -> AppResult<Alert> {
        input.validate()?;

        let mut conn = self.db.acquire().await?;
        let alert = Self::insert_in(
            &mut conn,
            input.medicine_id,
            input.alert_type,
            &input.message,
            input.severity,
        )
        .await?;

        Ok(alert)
    }

    /// Insert an alert on an existing connection (used inside the billing transaction)
    pub(crate) async fn insert_in(
        conn: &mut SqliteConnection,
        medicine_id: Uuid,
        alert_type: AlertType,
        message: &str,
        severity: Severity,
    ) -> AppResult<Alert> {
        let alert = Alert {
            id: Uuid::new_v4(),
            medicine_id,
            alert_type,
            message: message.to_string(),
            severity,
            resolved: false,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO alerts (id, medicine_id, alert_type, message, severity, resolved, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(alert.id)
        .bind(alert.medicine_id)
        .bind(alert.alert_type.as_str())
        .bind(&alert.message)
        .bind(alert.severity.as_str())
        .bind(alert.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.message().contains("FOREIGN KEY") => {
                AppError::NotFound("Medicine".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        tracing::info!(
            alert_id = %alert.id,
            medicine_id = %medicine_id,
            alert_type = alert.alert_type.as_str(),
            severity = alert.severity.as_str(),
            "Alert raised"
        );

        Ok(alert)
    }

    /// Unresolved alerts, most severe and newest first
    pub async fn list_unresolved(&self, severity: Option<Severity>) -> AppResult<Vec<Alert>> {
        let rows = sqlx::query_as::<_, AlertRow>(
            r#"
            SELECT id, medicine_id, alert_type, message, severity, resolved, created_at
            FROM alerts
            WHERE resolved = 0 AND (?1 IS NULL OR severity = ?1)
            ORDER BY CASE severity WHEN 'HIGH' THEN 0 WHEN 'MEDIUM' THEN 1 ELSE 2 END,
                     created_at DESC
            "#,
        )
        .bind(severity.map(|s| s.as_str()))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Alert::try_from).collect()
    }

    /// Mark an alert as resolved
    pub async fn resolve(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE alerts SET resolved = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Alert".to_string()));
        }

        tracing::info!(alert_id = %id, "Alert resolved");
        Ok(())
    }

    /// Expired (or expiring today) and out-of-stock medicines
    pub async fn emergency_report(&self, today: NaiveDate) -> AppResult<EmergencyReport> {
        let expired = sqlx::query_as::<_, (Uuid, String, Option<NaiveDate>)>(
            r#"
            SELECT id, brand_name, expiry_date
            FROM medicines
            WHERE expiry_date IS NOT NULL AND expiry_date <= ?
            ORDER BY expiry_date, brand_name
            "#,
        )
        .bind(today)
        .fetch_all(&self.db)
        .await?;

        let out_of_stock = sqlx::query_as::<_, (Uuid, String, Option<NaiveDate>)>(
            r#"
            SELECT id, brand_name, expiry_date
            FROM medicines
            WHERE quantity = 0
            ORDER BY brand_name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let to_items = |rows: Vec<(Uuid, String, Option<NaiveDate>)>| {
            rows.into_iter()
                .map(|(medicine_id, brand_name, expiry_date)| EmergencyItem {
                    medicine_id,
                    brand_name,
                    expiry_date,
                })
                .collect::<Vec<_>>()
        };

        let report = EmergencyReport {
            generated_on: today,
            expired: to_items(expired),
            out_of_stock: to_items(out_of_stock),
        };

        if !report.is_clear() {
            tracing::warn!(
                expired = report.expired.len(),
                out_of_stock = report.out_of_stock.len(),
                "Emergency items need attention"
            );
        }

        Ok(report)
    }
}
