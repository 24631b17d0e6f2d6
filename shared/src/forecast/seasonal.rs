//! Calendar seasonality

use chrono::{Datelike, NaiveDate};

use super::model::ForecastModel;

impl ForecastModel {
    /// Multiplier for a calendar month (1-12); anything else is neutral
    pub fn seasonal_factor(&self, month: u32) -> f64 {
        match month {
            1..=12 => self.seasonal_factors[(month - 1) as usize],
            _ => 1.0,
        }
    }

    /// Multiplier for the month containing `date`. Recomputed on every call.
    pub fn seasonal_factor_on(&self, date: NaiveDate) -> f64 {
        self.seasonal_factor(date.month())
    }
}
