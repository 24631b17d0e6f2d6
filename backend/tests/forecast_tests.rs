//! Demand forecast tests
//!
//! Tests for the forecast projector including:
//! - Heuristic fallback when the history window is too sparse
//! - Confidence decay and floors
//! - Reorder point derivation
//! - Determinism for a fixed "today"

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use shared::forecast::{project, ForecastModel};
use shared::models::{DailySales, ForecastBasis, MedicineSnapshot, ReportedAverage};
use uuid::Uuid;

fn snapshot(category: &str, quantity: i64, min_quantity: i64) -> MedicineSnapshot {
    MedicineSnapshot {
        id: Uuid::nil(),
        name: "Test medicine".to_string(),
        quantity,
        min_quantity,
        max_quantity: min_quantity * 4,
        category: category.to_string(),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Cardiac, no sales, July: round(20 * 1.5 * 30 * 1.05)
    #[test]
    fn test_cardiac_july_scenario() {
        let model = ForecastModel::default();
        let result = project(&snapshot("Cardiac", 80, 40), &[], date(2024, 7, 10), 1, &model);

        assert_eq!(result.next_month_demand(), Some(945));
        assert_eq!(result.weekly_avg, ReportedAverage::NotAvailable);
        assert_eq!(result.monthly_avg, ReportedAverage::NotAvailable);
        assert!(result.basis.is_heuristic());
    }

    #[test]
    fn test_seasonal_table_extremes() {
        let model = ForecastModel::default();
        let factors: Vec<f64> = (1..=12).map(|m| model.seasonal_factor(m)).collect();
        let max = factors.iter().cloned().fold(f64::MIN, f64::max);
        let min = factors.iter().cloned().fold(f64::MAX, f64::min);

        assert_eq!(model.seasonal_factor(7), 1.5);
        assert_eq!(max, 1.5);
        assert_eq!(min, 1.0);
        for month in [2, 3, 11] {
            assert_eq!(model.seasonal_factor(month), 1.0);
        }
    }

    /// Six distinct sale dates is one short of a usable window
    #[test]
    fn test_six_sale_days_is_insufficient() {
        let model = ForecastModel::default();
        let today = date(2024, 7, 15);
        let history: Vec<DailySales> = (1..=6)
            .map(|d| DailySales::new(today - Duration::days(d), 50))
            .collect();

        let result = project(&snapshot("Antibiotic", 60, 25), &history, today, 2, &model);
        assert!(matches!(result.basis, ForecastBasis::CategoryHeuristic { .. }));
    }

    /// Sales older than the 90-day window are ignored
    #[test]
    fn test_sales_outside_window_ignored() {
        let model = ForecastModel::default();
        let today = date(2024, 7, 15);
        let history: Vec<DailySales> = (100..140)
            .map(|d| DailySales::new(today - Duration::days(d), 10))
            .collect();

        let result = project(&snapshot("Other", 10, 5), &history, today, 1, &model);
        assert!(result.basis.is_heuristic());
    }

    #[test]
    fn test_month_labels_follow_today() {
        let model = ForecastModel::default();
        let result = project(&snapshot("GI", 10, 5), &[], date(2024, 12, 20), 2, &model);
        let names: Vec<&str> = result.forecasts.iter().map(|p| p.month_name.as_str()).collect();
        assert_eq!(names, vec!["Jan", "Feb"]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for category tags, including one the lookup table does not know
    fn category_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("Analgesic"),
            Just("Antibiotic"),
            Just("Cardiac"),
            Just("Diabetic"),
            Just("GI"),
            Just("Other"),
            Just("Dermatology"),
        ]
    }

    /// Strategy for dates across a few years
    fn today_strategy() -> impl Strategy<Value = NaiveDate> {
        (0i64..1500).prop_map(|offset| date(2023, 1, 1) + Duration::days(offset))
    }

    /// Sales as (days before today, units)
    fn history_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
        prop::collection::vec((0i64..120, 0i64..500), 0..80)
    }

    fn to_history(today: NaiveDate, raw: &[(i64, i64)]) -> Vec<DailySales> {
        raw.iter()
            .map(|&(back, quantity)| DailySales::new(today - Duration::days(back), quantity))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Confidence never rises month over month and never drops below 0.6
        #[test]
        fn prop_confidence_non_increasing_with_floor(
            category in category_strategy(),
            today in today_strategy(),
            raw in history_strategy(),
            quantity in 0i64..1000,
            horizon in 1u32..=24,
        ) {
            let model = ForecastModel::default();
            let history = to_history(today, &raw);
            let result = project(&snapshot(category, quantity, 20), &history, today, horizon, &model);

            prop_assert_eq!(result.forecasts.len(), horizon as usize);
            for point in &result.forecasts {
                prop_assert!(point.confidence >= 0.6);
                prop_assert!(point.confidence <= 1.0);
            }
            for pair in result.forecasts.windows(2) {
                prop_assert!(pair[1].confidence <= pair[0].confidence);
            }
        }

        /// reorder_point is exactly round(predicted_demand * 0.3)
        #[test]
        fn prop_reorder_point_is_thirty_percent(
            category in category_strategy(),
            today in today_strategy(),
            raw in history_strategy(),
            quantity in 0i64..1000,
            horizon in 1u32..=12,
        ) {
            let model = ForecastModel::default();
            let history = to_history(today, &raw);
            let result = project(&snapshot(category, quantity, 20), &history, today, horizon, &model);

            for point in &result.forecasts {
                let expected = (point.predicted_demand as f64 * 0.3).round() as i64;
                prop_assert_eq!(point.reorder_point, expected);
            }
        }

        /// Fewer than 7 distinct sale dates always falls back and reports N/A
        #[test]
        fn prop_sparse_history_uses_heuristic(
            category in category_strategy(),
            today in today_strategy(),
            days in prop::collection::btree_set(0i64..90, 0..7),
            units in 1i64..100,
        ) {
            let model = ForecastModel::default();
            let history: Vec<DailySales> = days
                .iter()
                .map(|&back| DailySales::new(today - Duration::days(back), units))
                .collect();
            let result = project(&snapshot(category, 50, 20), &history, today, 3, &model);

            prop_assert!(result.basis.is_heuristic());
            prop_assert_eq!(result.weekly_avg, ReportedAverage::NotAvailable);
            prop_assert_eq!(result.monthly_avg, ReportedAverage::NotAvailable);
        }

        /// Demand grows with the month index
        #[test]
        fn prop_demand_non_decreasing(
            category in category_strategy(),
            today in today_strategy(),
            raw in history_strategy(),
            horizon in 2u32..=12,
        ) {
            let model = ForecastModel::default();
            let history = to_history(today, &raw);
            let result = project(&snapshot(category, 100, 20), &history, today, horizon, &model);

            for pair in result.forecasts.windows(2) {
                prop_assert!(pair[1].predicted_demand >= pair[0].predicted_demand);
            }
        }

        /// Same inputs, same output
        #[test]
        fn prop_forecast_is_deterministic(
            category in category_strategy(),
            today in today_strategy(),
            raw in history_strategy(),
            horizon in 1u32..=6,
        ) {
            let model = ForecastModel::default();
            let history = to_history(today, &raw);
            let medicine = snapshot(category, 75, 30);

            let first = project(&medicine, &history, today, horizon, &model);
            let second = project(&medicine, &history, today, horizon, &model);
            prop_assert_eq!(first, second);
        }
    }
}
