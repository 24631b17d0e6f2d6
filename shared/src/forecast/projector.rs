//! Month-by-month demand projection

use chrono::{Days, NaiveDate};
use thiserror::Error;

use super::model::{ConfidenceDecay, ForecastModel};
use super::trend::{estimate_trend, TrendAverages, TrendEstimate};
use crate::models::{
    DailySales, FallbackReason, ForecastBasis, ForecastPoint, ForecastResult, MedicineSnapshot,
    ReportedAverage,
};

/// Days between consecutive month labels
const LABEL_STEP_DAYS: u64 = 30;

/// Arithmetic faults on the history path. Recovered by the projector, never surfaced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastFault {
    #[error("base demand is not a finite number ({0})")]
    NonFiniteDemand(f64),

    #[error("base demand is negative ({0})")]
    NegativeDemand(f64),

    #[error("projected demand for month {month} is out of range ({value})")]
    ProjectionOutOfRange { month: u32, value: f64 },
}

/// Forecast `horizon` months ahead of `today`.
///
/// Uses the moving-average trend when the history window has enough distinct
/// sale dates, otherwise the category heuristic. The seasonal factor is the
/// one for `today`'s month and is applied to every projected month.
pub fn project(
    snapshot: &MedicineSnapshot,
    history: &[DailySales],
    today: NaiveDate,
    horizon: u32,
    model: &ForecastModel,
) -> ForecastResult {
    let since = model.history_since(today);
    let window: Vec<DailySales> = history
        .iter()
        .filter(|d| d.date >= since && d.date <= today)
        .copied()
        .collect();

    match estimate_trend(&window, model) {
        TrendEstimate::InsufficientHistory { data_points } => project_from_category(
            snapshot,
            today,
            horizon,
            model,
            FallbackReason::InsufficientHistory { data_points },
        ),
        TrendEstimate::Observed {
            averages,
            data_points,
        } => match project_from_trend(snapshot, averages, data_points, today, horizon, model) {
            Ok(result) => result,
            // Intentional graceful degradation: a faulty history projection is
            // replaced by the category heuristic, with the fault kept in `basis`.
            Err(fault) => project_from_category(
                snapshot,
                today,
                horizon,
                model,
                FallbackReason::ComputationFault {
                    detail: fault.to_string(),
                },
            ),
        },
    }
}

/// History path. Growth is `1 + rate * month` against the same base for every
/// month, not compounded on the previous month.
pub fn project_from_trend(
    snapshot: &MedicineSnapshot,
    averages: TrendAverages,
    data_points: usize,
    today: NaiveDate,
    horizon: u32,
    model: &ForecastModel,
) -> Result<ForecastResult, ForecastFault> {
    let base = averages
        .blended()
        .unwrap_or(snapshot.quantity as f64 * model.fallback_stock_ratio);
    if !base.is_finite() {
        return Err(ForecastFault::NonFiniteDemand(base));
    }
    if base < 0.0 {
        return Err(ForecastFault::NegativeDemand(base));
    }

    let seasonal_factor = model.seasonal_factor_on(today);
    let adjusted = base * seasonal_factor;

    let mut forecasts = Vec::with_capacity(horizon as usize);
    for month in 1..=horizon {
        let raw = adjusted * model.days_per_month * model.growth_factor(month);
        if !raw.is_finite() || raw < 0.0 || raw >= i64::MAX as f64 {
            return Err(ForecastFault::ProjectionOutOfRange { month, value: raw });
        }
        forecasts.push(forecast_point(
            today,
            month,
            raw.round() as i64,
            model.history_confidence,
            model,
        ));
    }

    Ok(ForecastResult {
        medicine_id: snapshot.id,
        medicine: snapshot.name.clone(),
        current_stock: snapshot.quantity,
        min_stock: snapshot.min_quantity,
        weekly_avg: ReportedAverage::Value(round_tenth(averages.weekly_avg.unwrap_or(0.0))),
        monthly_avg: ReportedAverage::Value(round_tenth(averages.monthly_avg.unwrap_or(0.0))),
        seasonal_factor,
        basis: ForecastBasis::SalesHistory { data_points },
        generated_on: today,
        forecasts,
    })
}

/// Heuristic path: category base demand stands in for the blended average.
pub fn project_from_category(
    snapshot: &MedicineSnapshot,
    today: NaiveDate,
    horizon: u32,
    model: &ForecastModel,
    reason: FallbackReason,
) -> ForecastResult {
    let base_demand = model.base_daily_demand(&snapshot.category);
    let seasonal_factor = model.seasonal_factor_on(today);

    let forecasts = (1..=horizon)
        .map(|month| {
            let predicted =
                base_demand * model.growth_factor(month) * seasonal_factor * model.days_per_month;
            forecast_point(
                today,
                month,
                predicted.round() as i64,
                model.heuristic_confidence,
                model,
            )
        })
        .collect();

    ForecastResult {
        medicine_id: snapshot.id,
        medicine: snapshot.name.clone(),
        current_stock: snapshot.quantity,
        min_stock: snapshot.min_quantity,
        weekly_avg: ReportedAverage::NotAvailable,
        monthly_avg: ReportedAverage::NotAvailable,
        seasonal_factor,
        basis: ForecastBasis::CategoryHeuristic { reason },
        generated_on: today,
        forecasts,
    }
}

fn forecast_point(
    today: NaiveDate,
    month: u32,
    predicted_demand: i64,
    confidence: ConfidenceDecay,
    model: &ForecastModel,
) -> ForecastPoint {
    ForecastPoint {
        month,
        month_name: month_label(today, month),
        predicted_demand,
        confidence: confidence.at(month),
        reorder_point: model.reorder_point(predicted_demand),
    }
}

fn month_label(today: NaiveDate, month: u32) -> String {
    // Saturates at the last representable date
    today
        .checked_add_days(Days::new(LABEL_STEP_DAYS * u64::from(month)))
        .unwrap_or(NaiveDate::MAX)
        .format("%b")
        .to_string()
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
