//! Stock and expiry alert models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub alert_type: AlertType,
    pub message: String,
    pub severity: Severity,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    LowStock,
    OutOfStock,
    Expiry,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowStock => "LOW_STOCK",
            AlertType::OutOfStock => "OUT_OF_STOCK",
            AlertType::Expiry => "EXPIRY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LOW_STOCK" => Some(AlertType::LowStock),
            "OUT_OF_STOCK" => Some(AlertType::OutOfStock),
            "EXPIRY" => Some(AlertType::Expiry),
            _ => None,
        }
    }
}

/// Severity, ordered so that `High` sorts last (highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LOW" => Some(Severity::Low),
            "MEDIUM" => Some(Severity::Medium),
            "HIGH" => Some(Severity::High),
            _ => None,
        }
    }
}

/// Message recorded when a sale leaves stock at or below the minimum
pub fn low_stock_message(quantity: i64, min_quantity: i64) -> String {
    format!("Stock below minimum ({}/{})", quantity, min_quantity)
}

/// Line item on the emergency board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyItem {
    pub medicine_id: Uuid,
    pub brand_name: String,
    pub expiry_date: Option<NaiveDate>,
}

/// Everything that needs action today
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyReport {
    pub generated_on: NaiveDate,
    pub expired: Vec<EmergencyItem>,
    pub out_of_stock: Vec<EmergencyItem>,
}

impl EmergencyReport {
    pub fn is_clear(&self) -> bool {
        self.expired.is_empty() && self.out_of_stock.is_empty()
    }
}
