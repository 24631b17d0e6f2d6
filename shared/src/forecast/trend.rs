//! Moving-average trend over daily sales

use serde::{Deserialize, Serialize};

use super::model::ForecastModel;
use crate::models::{aggregate_daily, DailySales};

/// Trailing averages evaluated at the most recent sale date.
/// `None` when the series is shorter than the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAverages {
    pub weekly_avg: Option<f64>,
    pub monthly_avg: Option<f64>,
}

impl TrendAverages {
    /// Mean of the two averages, if both exist
    pub fn blended(&self) -> Option<f64> {
        match (self.weekly_avg, self.monthly_avg) {
            (Some(weekly), Some(monthly)) => Some((weekly + monthly) / 2.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrendEstimate {
    Observed {
        averages: TrendAverages,
        data_points: usize,
    },
    /// Too few distinct sale dates; the caller must use the category heuristic
    InsufficientHistory { data_points: usize },
}

/// Windows count distinct sale dates, not calendar days: a medicine that sold
/// on 7 scattered days in the window has a full weekly window.
pub fn estimate_trend(history: &[DailySales], model: &ForecastModel) -> TrendEstimate {
    let series: Vec<f64> = aggregate_daily(history.iter().map(|d| (d.date, d.quantity)))
        .into_iter()
        .map(|d| d.quantity as f64)
        .collect();

    let data_points = series.len();
    if data_points < model.min_history_points {
        return TrendEstimate::InsufficientHistory { data_points };
    }

    TrendEstimate::Observed {
        averages: TrendAverages {
            weekly_avg: trailing_mean(&series, model.weekly_window),
            monthly_avg: trailing_mean(&series, model.monthly_window),
        },
        data_points,
    }
}

fn trailing_mean(series: &[f64], window: usize) -> Option<f64> {
    if window == 0 || series.len() < window {
        return None;
    }
    let tail = &series[series.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(quantities: &[i64]) -> Vec<DailySales> {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        quantities
            .iter()
            .enumerate()
            .map(|(i, q)| DailySales::new(start + Duration::days(i as i64), *q))
            .collect()
    }

    #[test]
    fn test_insufficient_history_below_seven_dates() {
        let model = ForecastModel::default();
        let estimate = estimate_trend(&series(&[5, 5, 5, 5, 5, 5]), &model);
        assert_eq!(estimate, TrendEstimate::InsufficientHistory { data_points: 6 });
    }

    #[test]
    fn test_duplicate_dates_count_once() {
        let model = ForecastModel::default();
        let mut history = series(&[1, 1, 1, 1, 1, 1]);
        history.push(history[0]);
        assert_eq!(
            estimate_trend(&history, &model),
            TrendEstimate::InsufficientHistory { data_points: 6 }
        );
    }

    #[test]
    fn test_weekly_only_when_under_thirty_points() {
        let model = ForecastModel::default();
        let estimate = estimate_trend(&series(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]), &model);
        match estimate {
            TrendEstimate::Observed { averages, data_points } => {
                assert_eq!(data_points, 10);
                // last seven: 4..=10
                assert_eq!(averages.weekly_avg, Some(7.0));
                assert_eq!(averages.monthly_avg, None);
                assert_eq!(averages.blended(), None);
            }
            other => panic!("expected observed trend, got {:?}", other),
        }
    }

    #[test]
    fn test_both_windows_with_long_history() {
        let model = ForecastModel::default();
        let mut quantities = vec![2; 30];
        quantities.extend([9; 7]);
        let estimate = estimate_trend(&series(&quantities), &model);
        match estimate {
            TrendEstimate::Observed { averages, .. } => {
                assert_eq!(averages.weekly_avg, Some(9.0));
                // last thirty: 23 twos and 7 nines
                let expected = (23.0 * 2.0 + 7.0 * 9.0) / 30.0;
                assert!((averages.monthly_avg.unwrap() - expected).abs() < 1e-9);
            }
            other => panic!("expected observed trend, got {:?}", other),
        }
    }

    #[test]
    fn test_unsorted_input_is_ordered_by_date() {
        let model = ForecastModel::default();
        let mut history = series(&[1, 1, 1, 1, 1, 1, 1, 50]);
        history.reverse();
        match estimate_trend(&history, &model) {
            TrendEstimate::Observed { averages, .. } => {
                // most recent seven dates: 1 x6 and 50
                assert!((averages.weekly_avg.unwrap() - 56.0 / 7.0).abs() < 1e-9);
            }
            other => panic!("expected observed trend, got {:?}", other),
        }
    }
}
