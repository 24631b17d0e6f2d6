//! Sales and billing models

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// GST rate applied when the counter does not override it
pub const DEFAULT_GST_PERCENT: Decimal = Decimal::from_parts(18, 0, 0, false, 0);

/// One medicine line of a bill, as persisted. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: Uuid,
    pub bill_no: String,
    pub medicine_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub gst_percent: Decimal,
    /// unit_price * quantity
    pub line_total: Decimal,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub doctor_name: Option<String>,
    pub payment_mode: PaymentMode,
    pub sale_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Units sold for one medicine on one calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub quantity: i64,
}

impl DailySales {
    pub fn new(date: NaiveDate, quantity: i64) -> Self {
        Self { date, quantity }
    }
}

/// Sum quantities per date, ascending by date
pub fn aggregate_daily<I>(entries: I) -> Vec<DailySales>
where
    I: IntoIterator<Item = (NaiveDate, i64)>,
{
    let mut by_date: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for (date, quantity) in entries {
        *by_date.entry(date).or_insert(0) += quantity;
    }
    by_date
        .into_iter()
        .map(|(date, quantity)| DailySales { date, quantity })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentMode {
    #[default]
    Cash,
    Card,
    #[serde(rename = "UPI")]
    Upi,
    Credit,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Card => "Card",
            PaymentMode::Upi => "UPI",
            PaymentMode::Credit => "Credit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Cash" => Some(PaymentMode::Cash),
            "Card" => Some(PaymentMode::Card),
            "UPI" => Some(PaymentMode::Upi),
            "Credit" => Some(PaymentMode::Credit),
            _ => None,
        }
    }
}

/// Priced line used for bill arithmetic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillLine {
    pub medicine_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl BillLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Bill summary as printed on the receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub gst_amount: Decimal,
    pub grand_total: Decimal,
}

/// Discount applies to the subtotal; GST applies after discount.
pub fn compute_bill_totals(
    lines: &[BillLine],
    discount_percent: Decimal,
    gst_percent: Decimal,
) -> BillTotals {
    let hundred = Decimal::ONE_HUNDRED;
    let subtotal: Decimal = lines.iter().map(BillLine::subtotal).sum();
    let discount_amount = subtotal * discount_percent / hundred;
    let gst_amount = (subtotal - discount_amount) * gst_percent / hundred;
    BillTotals {
        subtotal,
        discount_amount,
        gst_amount,
        grand_total: subtotal - discount_amount + gst_amount,
    }
}

/// Bill number derived from the billing timestamp
pub fn bill_number(at: DateTime<Utc>) -> String {
    format!("BILL{}", at.format("%Y%m%d%H%M%S"))
}

/// Day-level sales summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesSummary {
    pub date: NaiveDate,
    pub bill_count: i64,
    pub units_sold: i64,
    pub revenue: Decimal,
}
