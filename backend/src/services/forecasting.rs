//! Demand forecasting and reorder recommendations
//!
//! Thin orchestration over `shared::forecast`: reads the medicine and its
//! sales window from the store, then hands both to the pure projector.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    FallbackReason, ForecastBasis, ForecastResult, ReorderCandidate, ReorderRecommendation,
};
use crate::services::{InventoryService, SalesService};
use shared::forecast::{project, project_from_category, rank, ForecastModel, ReorderPolicy};

#[derive(Clone)]
pub struct ForecastingService {
    inventory: InventoryService,
    sales: SalesService,
    model: Arc<ForecastModel>,
    policy: Arc<ReorderPolicy>,
}

impl ForecastingService {
    pub fn new(db: SqlitePool, model: Arc<ForecastModel>, policy: Arc<ReorderPolicy>) -> Self {
        Self {
            inventory: InventoryService::new(db.clone()),
            sales: SalesService::new(db),
            model,
            policy,
        }
    }

    /// Forecast demand for the next `horizon` months
    pub async fn forecast(&self, medicine_id: Uuid, horizon: u32) -> AppResult<ForecastResult> {
        self.forecast_as_of(medicine_id, horizon, Utc::now().date_naive())
            .await
    }

    pub async fn forecast_as_of(
        &self,
        medicine_id: Uuid,
        horizon: u32,
        today: NaiveDate,
    ) -> AppResult<ForecastResult> {
        if horizon == 0 {
            return Err(AppError::validation(
                "months",
                "Forecast horizon must be at least one month",
            ));
        }

        let snapshot = self.inventory.medicine_info(medicine_id).await?;

        let since = self.model.history_since(today);
        let history = match self.sales.daily_sales(medicine_id, since, today).await {
            Ok(history) => history,
            Err(err) => {
                // Same degradation as an arithmetic fault: an unreadable history
                // still yields the category forecast.
                tracing::warn!(
                    medicine_id = %medicine_id,
                    error = %err,
                    "Sales history unavailable, using category forecast"
                );
                return Ok(project_from_category(
                    &snapshot,
                    today,
                    horizon,
                    &self.model,
                    FallbackReason::ComputationFault {
                        detail: err.to_string(),
                    },
                ));
            }
        };

        let result = project(&snapshot, &history, today, horizon, &self.model);

        if let ForecastBasis::CategoryHeuristic {
            reason: FallbackReason::ComputationFault { detail },
        } = &result.basis
        {
            tracing::warn!(
                medicine_id = %medicine_id,
                detail = %detail,
                "History projection failed, degraded to category forecast"
            );
        } else {
            tracing::debug!(
                medicine_id = %medicine_id,
                horizon,
                heuristic = result.basis.is_heuristic(),
                "Forecast computed"
            );
        }

        Ok(result)
    }

    /// Reorder recommendations for every medicine near its minimum
    pub async fn recommend_reorders(&self) -> AppResult<Vec<ReorderRecommendation>> {
        self.recommend_reorders_as_of(Utc::now().date_naive()).await
    }

    pub async fn recommend_reorders_as_of(
        &self,
        today: NaiveDate,
    ) -> AppResult<Vec<ReorderRecommendation>> {
        let candidates = self
            .inventory
            .under_stocked_medicines(self.policy.restock_multiplier)
            .await?;
        let recent_since = today - Duration::days(self.policy.recent_sales_days);

        let mut recommendations = Vec::with_capacity(candidates.len());
        for row in candidates {
            if !self.policy.qualifies(row.quantity, row.min_quantity) {
                continue;
            }

            let recent_sales = self
                .sales
                .units_sold_since(row.medicine_id, recent_since)
                .await?;
            let forecast = self.forecast_as_of(row.medicine_id, 1, today).await?;
            let predicted_demand = forecast.next_month_demand().unwrap_or(0);

            let candidate = ReorderCandidate {
                medicine_id: row.medicine_id,
                medicine: row.brand_name,
                quantity: row.quantity,
                min_quantity: row.min_quantity,
                max_quantity: row.max_quantity,
                recent_sales,
            };
            recommendations.push(self.policy.recommend(&candidate, predicted_demand));
        }

        rank(&mut recommendations);

        tracing::info!(count = recommendations.len(), "Reorder recommendations computed");
        Ok(recommendations)
    }
}
