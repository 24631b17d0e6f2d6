//! Demand forecast and reorder recommendation models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Projected demand for one month ahead of the forecast date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 1-based offset from the forecast date
    pub month: u32,
    /// Abbreviated month name, e.g. "Aug"
    pub month_name: String,
    pub predicted_demand: i64,
    /// In [0.6, 1.0], non-increasing with `month`
    pub confidence: f64,
    pub reorder_point: i64,
}

/// Rolling average as shown on the forecast card; `"N/A"` on the heuristic path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportedAverage {
    Value(f64),
    NotAvailable,
}

impl ReportedAverage {
    pub fn value(&self) -> Option<f64> {
        match self {
            ReportedAverage::Value(v) => Some(*v),
            ReportedAverage::NotAvailable => None,
        }
    }
}

impl Serialize for ReportedAverage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReportedAverage::Value(v) => serializer.serialize_f64(*v),
            ReportedAverage::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for ReportedAverage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(ReportedAverage::Value(v)),
            Raw::Text(t) if t == "N/A" => Ok(ReportedAverage::NotAvailable),
            Raw::Text(other) => Err(de::Error::custom(format!(
                "expected a number or \"N/A\", got {:?}",
                other
            ))),
        }
    }
}

/// Which path produced the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastBasis {
    SalesHistory { data_points: usize },
    CategoryHeuristic { reason: FallbackReason },
}

impl ForecastBasis {
    pub fn is_heuristic(&self) -> bool {
        matches!(self, ForecastBasis::CategoryHeuristic { .. })
    }
}

/// Why the category heuristic stood in for sales history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum FallbackReason {
    InsufficientHistory { data_points: usize },
    ComputationFault { detail: String },
}

/// Full forecast for one medicine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub medicine_id: Uuid,
    pub medicine: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub weekly_avg: ReportedAverage,
    pub monthly_avg: ReportedAverage,
    pub seasonal_factor: f64,
    pub basis: ForecastBasis,
    pub generated_on: NaiveDate,
    pub forecasts: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Predicted demand for the first projected month
    pub fn next_month_demand(&self) -> Option<i64> {
        self.forecasts.first().map(|p| p.predicted_demand)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    High,
    Medium,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::High => write!(f, "HIGH"),
            Urgency::Medium => write!(f, "MEDIUM"),
        }
    }
}

/// Medicine eligible for a reorder recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderCandidate {
    pub medicine_id: Uuid,
    pub medicine: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    /// Units sold over the trailing 30 days
    pub recent_sales: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderRecommendation {
    pub medicine_id: Uuid,
    pub medicine: String,
    pub current_stock: i64,
    pub min_required: i64,
    pub monthly_sales: i64,
    pub predicted_demand: i64,
    pub reorder_qty: i64,
    pub urgency: Urgency,
    pub est_cost: Decimal,
}

impl ReorderRecommendation {
    pub fn shortfall(&self) -> i64 {
        self.min_required - self.current_stock
    }
}
