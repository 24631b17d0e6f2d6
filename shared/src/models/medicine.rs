//! Medicine catalogue models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stocked medicine (one batch line in the pharmacy catalogue)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub brand_name: String,
    pub generic_name: Option<String>,
    pub company: Option<String>,
    pub batch_no: Option<String>,
    pub mfg_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    /// Maximum Retail Price charged at the counter
    pub mrp: Decimal,
    /// Unit cost paid to the supplier
    pub purchase_price: Decimal,
    /// Stored category tag; see [`MedicineCategory::parse`]
    pub category: String,
    pub schedule: DrugSchedule,
    pub store_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    /// Units needed to get back to the minimum threshold (negative when above it)
    pub fn shortage(&self) -> i64 {
        self.min_quantity - self.quantity
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    /// Days until expiry relative to `today`, if an expiry date is recorded
    pub fn days_to_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date.map(|expiry| (expiry - today).num_days())
    }

    pub fn snapshot(&self) -> MedicineSnapshot {
        MedicineSnapshot {
            id: self.id,
            name: self.brand_name.clone(),
            quantity: self.quantity,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
            category: self.category.clone(),
        }
    }
}

/// Point-in-time view of a medicine used by the forecasting engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineSnapshot {
    pub id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub max_quantity: i64,
    pub category: String,
}

/// Therapeutic category used for the demand heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicineCategory {
    Analgesic,
    Antibiotic,
    Cardiac,
    Diabetic,
    #[serde(rename = "GI")]
    Gastrointestinal,
    Other,
}

impl MedicineCategory {
    pub const ALL: [MedicineCategory; 6] = [
        MedicineCategory::Analgesic,
        MedicineCategory::Antibiotic,
        MedicineCategory::Cardiac,
        MedicineCategory::Diabetic,
        MedicineCategory::Gastrointestinal,
        MedicineCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MedicineCategory::Analgesic => "Analgesic",
            MedicineCategory::Antibiotic => "Antibiotic",
            MedicineCategory::Cardiac => "Cardiac",
            MedicineCategory::Diabetic => "Diabetic",
            MedicineCategory::Gastrointestinal => "GI",
            MedicineCategory::Other => "Other",
        }
    }

    /// Parse a stored category tag. Matching is exact; anything else is unrecognized.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == tag)
    }
}

impl std::fmt::Display for MedicineCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regulatory dispensing schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DrugSchedule {
    /// Over the counter
    #[default]
    #[serde(rename = "OTC")]
    Otc,
    /// Prescription required
    #[serde(rename = "Schedule H")]
    ScheduleH,
}

impl DrugSchedule {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrugSchedule::Otc => "OTC",
            DrugSchedule::ScheduleH => "Schedule H",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OTC" => Some(DrugSchedule::Otc),
            "Schedule H" => Some(DrugSchedule::ScheduleH),
            _ => None,
        }
    }

    pub fn requires_prescription(&self) -> bool {
        matches!(self, DrugSchedule::ScheduleH)
    }
}

/// Expiry urgency bucket shown on the alerts board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryUrgency {
    /// 7 days or fewer
    Critical,
    /// 8-30 days
    High,
    /// 31-60 days
    Medium,
    /// beyond 60 days
    Low,
}

impl ExpiryUrgency {
    pub fn from_days_left(days_left: i64) -> Self {
        match days_left {
            d if d <= 7 => ExpiryUrgency::Critical,
            d if d <= 30 => ExpiryUrgency::High,
            d if d <= 60 => ExpiryUrgency::Medium,
            _ => ExpiryUrgency::Low,
        }
    }
}

/// Priority for a medicine at or below its minimum threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LowStockPriority {
    High,
    Medium,
    Low,
}

impl LowStockPriority {
    pub fn classify(quantity: i64, min_quantity: i64) -> Self {
        let shortage = min_quantity - quantity;
        if quantity == 0 {
            LowStockPriority::High
        } else if shortage > min_quantity {
            // Needs a negative quantity; stock is never below zero

            LowStockPriority::Medium
        } else {
            LowStockPriority::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_stored_tags() {
        for category in MedicineCategory::ALL {
            assert_eq!(MedicineCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(MedicineCategory::parse("gi"), None);
        assert_eq!(MedicineCategory::parse("Dermatology"), None);
    }

    #[test]
    fn test_category_serializes_gi_tag() {
        let json = serde_json::to_string(&MedicineCategory::Gastrointestinal).unwrap();
        assert_eq!(json, "\"GI\"");
    }

    #[test]
    fn test_schedule_h_requires_prescription() {
        assert!(DrugSchedule::ScheduleH.requires_prescription());
        assert!(!DrugSchedule::Otc.requires_prescription());
        assert_eq!(DrugSchedule::parse("Schedule H"), Some(DrugSchedule::ScheduleH));
    }

    #[test]
    fn test_expiry_buckets() {
        assert_eq!(ExpiryUrgency::from_days_left(0), ExpiryUrgency::Critical);
        assert_eq!(ExpiryUrgency::from_days_left(7), ExpiryUrgency::Critical);
        assert_eq!(ExpiryUrgency::from_days_left(8), ExpiryUrgency::High);
        assert_eq!(ExpiryUrgency::from_days_left(30), ExpiryUrgency::High);
        assert_eq!(ExpiryUrgency::from_days_left(45), ExpiryUrgency::Medium);
        assert_eq!(ExpiryUrgency::from_days_left(61), ExpiryUrgency::Low);
    }

    #[test]
    fn test_low_stock_priority() {
        assert_eq!(LowStockPriority::classify(0, 20), LowStockPriority::High);
        assert_eq!(LowStockPriority::classify(5, 20), LowStockPriority::Low);
        assert_eq!(LowStockPriority::classify(-1, 0), LowStockPriority::Medium);
    }
}
