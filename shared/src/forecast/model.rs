//! Tunable forecasting tables and policies
//!
//! Loaded once at process start (defaults, then configuration overrides) and
//! shared read-only afterwards.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::MedicineCategory;

/// Monthly demand multipliers, January first. Models the monsoon-driven curve.
pub const DEFAULT_SEASONAL_FACTORS: [f64; 12] =
    [1.1, 1.0, 1.0, 1.2, 1.3, 1.4, 1.5, 1.4, 1.3, 1.1, 1.0, 1.2];

/// Base daily demand per category when sales history is too thin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryDemand {
    pub analgesic: f64,
    pub antibiotic: f64,
    pub cardiac: f64,
    pub diabetic: f64,
    pub gi: f64,
    pub other: f64,
    /// Any tag outside the fixed enumeration
    pub unrecognized: f64,
}

impl Default for CategoryDemand {
    fn default() -> Self {
        Self {
            analgesic: 30.0,
            antibiotic: 25.0,
            cardiac: 20.0,
            diabetic: 35.0,
            gi: 28.0,
            other: 15.0,
            unrecognized: 20.0,
        }
    }
}

impl CategoryDemand {
    pub fn for_category(&self, category: MedicineCategory) -> f64 {
        match category {
            MedicineCategory::Analgesic => self.analgesic,
            MedicineCategory::Antibiotic => self.antibiotic,
            MedicineCategory::Cardiac => self.cardiac,
            MedicineCategory::Diabetic => self.diabetic,
            MedicineCategory::Gastrointestinal => self.gi,
            MedicineCategory::Other => self.other,
        }
    }
}

/// Confidence decay: `max(floor, 1 - step * month)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceDecay {
    pub floor: f64,
    pub step: f64,
}

impl ConfidenceDecay {
    pub fn at(&self, month: u32) -> f64 {
        (1.0 - self.step * f64::from(month)).max(self.floor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastModel {
    pub seasonal_factors: [f64; 12],
    pub category_demand: CategoryDemand,
    /// Trailing window of sales history read for the trend
    pub history_window_days: i64,
    /// Distinct sale dates required before the trend is trusted
    pub min_history_points: usize,
    pub weekly_window: usize,
    pub monthly_window: usize,
    /// Flat growth per month ahead, applied to the base (not compounded)
    pub monthly_growth_rate: f64,
    pub days_per_month: f64,
    pub reorder_point_ratio: f64,
    /// Share of current stock used as daily demand when an average is missing
    pub fallback_stock_ratio: f64,
    pub history_confidence: ConfidenceDecay,
    pub heuristic_confidence: ConfidenceDecay,
}

impl Default for ForecastModel {
    fn default() -> Self {
        Self {
            seasonal_factors: DEFAULT_SEASONAL_FACTORS,
            category_demand: CategoryDemand::default(),
            history_window_days: 90,
            min_history_points: 7,
            weekly_window: 7,
            monthly_window: 30,
            monthly_growth_rate: 0.05,
            days_per_month: 30.0,
            reorder_point_ratio: 0.3,
            fallback_stock_ratio: 0.3,
            history_confidence: ConfidenceDecay {
                floor: 0.7,
                step: 0.1,
            },
            heuristic_confidence: ConfidenceDecay {
                floor: 0.6,
                step: 0.15,
            },
        }
    }
}

impl ForecastModel {
    /// Base daily demand for a stored category tag
    pub fn base_daily_demand(&self, category_tag: &str) -> f64 {
        match MedicineCategory::parse(category_tag) {
            Some(category) => self.category_demand.for_category(category),
            None => self.category_demand.unrecognized,
        }
    }

    /// First date of the sales history window ending at `today`
    pub fn history_since(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.history_window_days)
    }

    /// Growth multiplier for the `month`-th month ahead
    pub fn growth_factor(&self, month: u32) -> f64 {
        1.0 + self.monthly_growth_rate * f64::from(month)
    }

    pub fn reorder_point(&self, predicted_demand: i64) -> i64 {
        (predicted_demand as f64 * self.reorder_point_ratio).round() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderPolicy {
    /// Medicines at or below `min_quantity * restock_multiplier` are considered
    pub restock_multiplier: f64,
    pub safety_stock_ratio: f64,
    pub lead_time_ratio: f64,
    /// At or below `min_quantity * high_urgency_ratio` is HIGH urgency
    pub high_urgency_ratio: f64,
    /// Flat per-unit cost used for the purchase estimate
    pub placeholder_unit_cost: Decimal,
    pub recent_sales_days: i64,
}

impl Default for ReorderPolicy {
    fn default() -> Self {
        Self {
            restock_multiplier: 1.5,
            safety_stock_ratio: 0.3,
            lead_time_ratio: 0.1,
            high_urgency_ratio: 0.5,
            placeholder_unit_cost: Decimal::from(50),
            recent_sales_days: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookup_table() {
        let model = ForecastModel::default();
        assert_eq!(model.base_daily_demand("Analgesic"), 30.0);
        assert_eq!(model.base_daily_demand("Antibiotic"), 25.0);
        assert_eq!(model.base_daily_demand("Cardiac"), 20.0);
        assert_eq!(model.base_daily_demand("Diabetic"), 35.0);
        assert_eq!(model.base_daily_demand("GI"), 28.0);
        assert_eq!(model.base_daily_demand("Other"), 15.0);
        assert_eq!(model.base_daily_demand("Dermatology"), 20.0);
        assert_eq!(model.base_daily_demand(""), 20.0);
    }

    #[test]
    fn test_confidence_decay_floors() {
        let model = ForecastModel::default();
        assert!((model.history_confidence.at(1) - 0.9).abs() < 1e-9);
        assert_eq!(model.history_confidence.at(5), 0.7);
        assert!((model.heuristic_confidence.at(1) - 0.85).abs() < 1e-9);
        assert_eq!(model.heuristic_confidence.at(3), 0.6);
    }

    #[test]
    fn test_history_window() {
        let model = ForecastModel::default();
        let today = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        assert_eq!(
            model.history_since(today),
            NaiveDate::from_ymd_opt(2024, 4, 16).unwrap()
        );
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let model: ForecastModel =
            serde_json::from_str(r#"{"monthly_growth_rate": 0.1, "category_demand": {"cardiac": 12.0}}"#)
                .unwrap();
        assert_eq!(model.monthly_growth_rate, 0.1);
        assert_eq!(model.category_demand.cardiac, 12.0);
        assert_eq!(model.category_demand.analgesic, 30.0);
        assert_eq!(model.seasonal_factors, DEFAULT_SEASONAL_FACTORS);
    }
}
