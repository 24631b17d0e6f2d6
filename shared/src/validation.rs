//! Validation utilities for the MedStock platform
//!
//! Includes India-specific checks used at the billing counter.

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate min/max stock thresholds
pub fn validate_stock_thresholds(min_quantity: i64, max_quantity: i64) -> Result<(), &'static str> {
    if min_quantity < 0 || max_quantity < 0 {
        return Err("Stock thresholds cannot be negative");
    }
    if min_quantity > max_quantity {
        return Err("Minimum stock cannot exceed maximum stock");
    }
    Ok(())
}

/// Validate a price (MRP or purchase price)
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Validate batch dates: expiry must come after manufacture
pub fn validate_batch_dates(
    mfg_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
) -> Result<(), &'static str> {
    match (mfg_date, expiry_date) {
        (Some(mfg), Some(expiry)) if expiry <= mfg => {
            Err("Expiry date must be after manufacturing date")
        }
        _ => Ok(()),
    }
}

/// Validate forecast horizon in months
pub fn validate_forecast_horizon(months: u32, max_months: u32) -> Result<(), &'static str> {
    if months == 0 {
        return Err("Forecast horizon must be at least one month");
    }
    if months > max_months {
        return Err("Forecast horizon exceeds the configured maximum");
    }
    Ok(())
}

// ============================================================================
// Billing Validations
// ============================================================================

/// Validate discount percentage (0-100)
pub fn validate_discount_percent(discount: Decimal) -> Result<(), &'static str> {
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err("Discount must be between 0 and 100%");
    }
    Ok(())
}

/// Validate GST percentage (non-negative)
pub fn validate_gst_percent(gst: Decimal) -> Result<(), &'static str> {
    if gst < Decimal::ZERO {
        return Err("GST cannot be negative");
    }
    Ok(())
}

// ============================================================================
// India-Specific Validations
// ============================================================================

/// Validate Indian mobile number
/// Accepts: 9876543210, 098765 43210, +91 98765 43210
pub fn validate_indian_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let national = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('0') => &digits[1..],
        12 if digits.starts_with("91") => &digits[2..],
        _ => return Err("Invalid Indian phone number format"),
    };

    // Mobile numbers start with 6, 7, 8 or 9
    match national.chars().next() {
        Some('6'..='9') => Ok(()),
        _ => Err("Invalid Indian phone number format"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_stock_thresholds() {
        assert!(validate_stock_thresholds(20, 200).is_ok());
        assert!(validate_stock_thresholds(20, 20).is_ok());
        assert!(validate_stock_thresholds(50, 20).is_err());
        assert!(validate_stock_thresholds(-1, 20).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(dec("15.00")).is_ok());
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(dec("-0.01")).is_err());
    }

    #[test]
    fn test_validate_batch_dates() {
        let mfg = NaiveDate::from_ymd_opt(2024, 1, 15);
        let expiry = NaiveDate::from_ymd_opt(2025, 12, 31);
        assert!(validate_batch_dates(mfg, expiry).is_ok());
        assert!(validate_batch_dates(expiry, mfg).is_err());
        assert!(validate_batch_dates(None, expiry).is_ok());
    }

    #[test]
    fn test_validate_forecast_horizon() {
        assert!(validate_forecast_horizon(1, 24).is_ok());
        assert!(validate_forecast_horizon(24, 24).is_ok());
        assert!(validate_forecast_horizon(0, 24).is_err());
        assert!(validate_forecast_horizon(25, 24).is_err());
    }

    #[test]
    fn test_validate_discount_percent() {
        assert!(validate_discount_percent(Decimal::ZERO).is_ok());
        assert!(validate_discount_percent(dec("100")).is_ok());
        assert!(validate_discount_percent(dec("100.5")).is_err());
        assert!(validate_discount_percent(dec("-5")).is_err());
    }

    #[test]
    fn test_validate_gst_percent() {
        assert!(validate_gst_percent(dec("18")).is_ok());
        assert!(validate_gst_percent(dec("-1")).is_err());
    }

    #[test]
    fn test_validate_indian_phone_valid() {
        assert!(validate_indian_phone("9876543210").is_ok());
        assert!(validate_indian_phone("+91 98765 43210").is_ok());
        assert!(validate_indian_phone("09876543210").is_ok());
        assert!(validate_indian_phone("98765-43210").is_ok());
    }

    #[test]
    fn test_validate_indian_phone_invalid() {
        assert!(validate_indian_phone("1234567890").is_err()); // landline-style prefix
        assert!(validate_indian_phone("98765").is_err());
        assert!(validate_indian_phone("+44 7700 900123").is_err());
    }
}
