//! WebAssembly module for the MedStock pharmacy platform
//!
//! Provides client-side computation for:
//! - Bill totals at the counter
//! - Demand forecasts from cached sales history
//! - Seasonal factors and reorder urgency
//! - Offline data validation

use chrono::NaiveDate;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::forecast::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Longest forecast the browser may request, matching the server default
const MAX_FORECAST_MONTHS: u32 = 24;

/// Seasonal demand multiplier for a calendar month (1-12)
#[wasm_bindgen]
pub fn seasonal_factor_for_month(month: u32) -> f64 {
    ForecastModel::default().seasonal_factor(month)
}

/// Seasonal multiplier for the browser's current month
#[wasm_bindgen]
pub fn current_seasonal_factor() -> f64 {
    // JS months are zero-based
    let month = js_sys::Date::new_0().get_month() + 1;
    seasonal_factor_for_month(month)
}

/// Forecast demand from a medicine snapshot and its daily sales.
///
/// `today` is `YYYY-MM-DD`; the result is the forecast as JSON.
#[wasm_bindgen]
pub fn forecast_demand(
    medicine_json: &str,
    sales_json: &str,
    today: &str,
    months: u32,
) -> Result<String, JsValue> {
    let result = run_forecast(medicine_json, sales_json, today, months)
        .map_err(|e| JsValue::from_str(&e))?;

    if let ForecastBasis::CategoryHeuristic {
        reason: FallbackReason::ComputationFault { detail },
    } = &result.basis
    {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "forecast fell back to category demand: {}",
            detail
        )));
    }

    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn run_forecast(
    medicine_json: &str,
    sales_json: &str,
    today: &str,
    months: u32,
) -> Result<ForecastResult, String> {
    let medicine: MedicineSnapshot = serde_json::from_str(medicine_json)
        .map_err(|e| format!("Invalid medicine JSON: {}", e))?;
    let sales: Vec<DailySales> =
        serde_json::from_str(sales_json).map_err(|e| format!("Invalid sales JSON: {}", e))?;
    let today = NaiveDate::parse_from_str(today, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", today, e))?;
    validate_forecast_horizon(months, MAX_FORECAST_MONTHS)?;

    Ok(project(
        &medicine,
        &sales,
        today,
        months,
        &ForecastModel::default(),
    ))
}

/// Bill totals for a JSON array of bill lines
#[wasm_bindgen]
pub fn calculate_bill_totals(
    lines_json: &str,
    discount_percent: f64,
    gst_percent: f64,
) -> Result<String, JsValue> {
    let totals =
        bill_totals(lines_json, discount_percent, gst_percent).map_err(|e| JsValue::from_str(&e))?;
    serde_json::to_string(&totals).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn bill_totals(lines_json: &str, discount_percent: f64, gst_percent: f64) -> Result<BillTotals, String> {
    let lines: Vec<BillLine> =
        serde_json::from_str(lines_json).map_err(|e| format!("Invalid bill JSON: {}", e))?;
    let discount = Decimal::try_from(discount_percent).map_err(|e| e.to_string())?;
    let gst = Decimal::try_from(gst_percent).map_err(|e| e.to_string())?;
    validate_discount_percent(discount)?;
    validate_gst_percent(gst)?;

    Ok(compute_bill_totals(&lines, discount, gst))
}

/// Validate a customer mobile number
#[wasm_bindgen]
pub fn is_valid_phone(phone: &str) -> bool {
    validate_indian_phone(phone).is_ok()
}

/// "HIGH" or "MEDIUM" reorder urgency
#[wasm_bindgen]
pub fn reorder_urgency(quantity: i64, min_quantity: i64) -> String {
    ReorderPolicy::default()
        .urgency(quantity, min_quantity)
        .to_string()
}
