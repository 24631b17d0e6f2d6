//! Dashboard reporting

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{types::Text, SqlitePool};

use crate::error::AppResult;

#[derive(Clone)]
pub struct ReportingService {
    db: SqlitePool,
}

/// Headline numbers for the pharmacy dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub generated_on: NaiveDate,
    pub total_medicines: i64,
    pub low_stock: i64,
    pub expiring_soon: i64,
    pub today_revenue: Decimal,
    /// Sum of quantity x purchase price
    pub inventory_value: Decimal,
    pub critical_alerts: i64,
    pub pending_reorders: i64,
}

impl ReportingService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Dashboard snapshot for `today`
    pub async fn dashboard(
        &self,
        today: NaiveDate,
        expiry_window_days: i64,
    ) -> AppResult<DashboardStats> {
        let total_medicines = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM medicines")
            .fetch_one(&self.db)
            .await?;

        let low_stock = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM medicines WHERE quantity <= min_quantity",
        )
        .fetch_one(&self.db)
        .await?;

        let expiring_soon = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM medicines
            WHERE expiry_date IS NOT NULL AND expiry_date BETWEEN ? AND ?
            "#,
        )
        .bind(today)
        .bind(today + Duration::days(expiry_window_days))
        .fetch_one(&self.db)
        .await?;

        let today_revenue: Decimal = sqlx::query_scalar::<_, Text<Decimal>>(
            "SELECT line_total FROM sales WHERE sale_date = ?",
        )
        .bind(today)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|total| total.0)
        .sum();

        let inventory_value: Decimal = sqlx::query_as::<_, (i64, Text<Decimal>)>(
            "SELECT quantity, purchase_price FROM medicines",
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(quantity, price)| Decimal::from(quantity) * price.0)
        .sum();

        let critical_alerts = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM alerts WHERE resolved = 0 AND severity = 'HIGH'",
        )
        .fetch_one(&self.db)
        .await?;

        let pending_reorders = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reorder_queue WHERE status = 'pending'",
        )
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(total_medicines, low_stock, expiring_soon, "Dashboard computed");

        Ok(DashboardStats {
            generated_on: today,
            total_medicines,
            low_stock,
            expiring_soon,
            today_revenue,
            inventory_value,
            critical_alerts,
            pending_reorders,
        })
    }
}
