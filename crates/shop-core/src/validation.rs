//! # Input Validation
//!
//! Validation functions for data entering the system. All validators return
//! `Result<(), ValidationError>` so they compose with `?`.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Strategy                                 │
//! │                                                                         │
//! │  Layer 1: This module (pure, no I/O)                                    │
//! │    - Formats, ranges, required fields                                   │
//! │                                                                         │
//! │  Layer 2: Repositories (shop-db)                                        │
//! │    - Uniqueness, foreign keys, existence                                │
//! │                                                                         │
//! │  Layer 3: SQLite constraints                                            │
//! │    - Last line of defense (UNIQUE indexes, CHECK, FK)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_PURCHASE_QUANTITY;

// =============================================================================
// Quantities and Prices
// =============================================================================

/// Validates a purchase quantity: positive and within the sanity cap.
pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_PURCHASE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_PURCHASE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a price in đồng (must not be negative).
pub fn validate_price(field: &str, dong: i64) -> Result<(), ValidationError> {
    if dong < 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates the price pair on a flash-sale product.
///
/// The flash price must be positive and strictly lower than the original
/// price, otherwise the listing is not a discount at all.
pub fn validate_flash_pricing(original_price: i64, flash_price: i64) -> Result<(), ValidationError> {
    if original_price <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "original_price".to_string(),
        });
    }
    if flash_price <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "flash_price".to_string(),
        });
    }
    if flash_price >= original_price {
        return Err(ValidationError::InvalidFormat {
            field: "flash_price".to_string(),
            reason: "must be lower than the original price".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Commission
// =============================================================================

/// Validates a commission rate expressed as a fraction.
///
/// Persisted rates are fractions in 0..=1 (0.1 = 10%). Anything outside that
/// range is rejected rather than silently clamped.
pub fn validate_commission_fraction(fraction: f64) -> Result<(), ValidationError> {
    if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
        return Err(ValidationError::OutOfRange {
            field: "commission_rate".to_string(),
            min: 0,
            max: 1,
        });
    }
    Ok(())
}

// =============================================================================
// Time Windows
// =============================================================================

/// Validates a flash-sale time window (end strictly after start).
pub fn validate_time_range(start_unix: i64, end_unix: i64) -> Result<(), ValidationError> {
    if end_unix <= start_unix {
        return Err(ValidationError::InvalidFormat {
            field: "end_time".to_string(),
            reason: "must be after start_time".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Identity Fields
// =============================================================================

/// Validates a customer or collaborator phone number.
///
/// Accepts 9 to 11 digits with an optional single leading `0`. Formatting
/// characters must be stripped by the caller before validation.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "digits only".to_string(),
        });
    }
    if trimmed.len() < 9 {
        return Err(ValidationError::TooShort {
            field: "phone".to_string(),
            min: 9,
        });
    }
    if trimmed.len() > 11 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 11,
        });
    }
    Ok(())
}

/// Validates an order reference (non-empty after trimming).
///
/// Purchases, cancellation, and settlement all key on the order id, so an
/// empty one must never reach a write.
pub fn validate_order_id(order_id: &str) -> Result<(), ValidationError> {
    if order_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "order_id".to_string(),
        });
    }
    Ok(())
}

/// Validates a person or sale name (non-empty, at most 100 characters).
pub fn validate_name(field: &str, name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if trimmed.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 100,
        });
    }
    Ok(())
}

/// Validates a referral code: 3 to 20 characters, uppercase letters and
/// digits only (e.g. `CTV001`).
pub fn validate_referral_code(code: &str) -> Result<(), ValidationError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "referral_code".to_string(),
        });
    }
    if trimmed.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "referral_code".to_string(),
            min: 3,
        });
    }
    if trimmed.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "referral_code".to_string(),
            max: 20,
        });
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidFormat {
            field: "referral_code".to_string(),
            reason: "uppercase letters and digits only".to_string(),
        });
    }
    Ok(())
}

/// Validates a settlement month key in `YYYY-MM` form.
pub fn validate_month(month: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidFormat {
        field: "month".to_string(),
        reason: "expected YYYY-MM".to_string(),
    };

    let bytes = month.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return Err(invalid());
    }
    if !bytes[..4].iter().all(u8::is_ascii_digit) || !bytes[5..].iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let mm: u32 = month[5..].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&mm) {
        return Err(invalid());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(MAX_PURCHASE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_PURCHASE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("total_amount", 0).is_ok());
        assert!(validate_price("total_amount", 500_000).is_ok());
        assert!(validate_price("total_amount", -1).is_err());
    }

    #[test]
    fn test_validate_flash_pricing() {
        assert!(validate_flash_pricing(150_000, 99_000).is_ok());
        assert!(validate_flash_pricing(150_000, 150_000).is_err()); // not a discount
        assert!(validate_flash_pricing(150_000, 200_000).is_err()); // markup
        assert!(validate_flash_pricing(0, 0).is_err());
        assert!(validate_flash_pricing(150_000, 0).is_err());
    }

    #[test]
    fn test_validate_commission_fraction() {
        assert!(validate_commission_fraction(0.0).is_ok());
        assert!(validate_commission_fraction(0.1).is_ok());
        assert!(validate_commission_fraction(1.0).is_ok());
        assert!(validate_commission_fraction(1.01).is_err());
        assert!(validate_commission_fraction(-0.1).is_err());
        assert!(validate_commission_fraction(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_time_range() {
        assert!(validate_time_range(100, 200).is_ok());
        assert!(validate_time_range(200, 200).is_err());
        assert!(validate_time_range(300, 200).is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0912345678").is_ok());
        assert!(validate_phone("912345678").is_ok());
        assert!(validate_phone("84912345678").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("091234567890").is_err());
        assert!(validate_phone("09-1234-5678").is_err());
    }

    #[test]
    fn test_validate_order_id() {
        assert!(validate_order_id("a3f1c2d4").is_ok());
        assert!(validate_order_id("").is_err());
        assert!(validate_order_id("   ").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("full_name", "Nguyễn Thị Mai").is_ok());
        assert!(validate_name("full_name", "").is_err());
        assert!(validate_name("full_name", "   ").is_err());
        assert!(validate_name("full_name", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_referral_code() {
        assert!(validate_referral_code("CTV001").is_ok());
        assert!(validate_referral_code("ABC").is_ok());
        assert!(validate_referral_code("ctv001").is_err()); // lowercase
        assert!(validate_referral_code("CT").is_err()); // too short
        assert!(validate_referral_code("CTV-001").is_err()); // hyphen
        assert!(validate_referral_code("").is_err());
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month("2025-01").is_ok());
        assert!(validate_month("2025-12").is_ok());
        assert!(validate_month("2025-13").is_err());
        assert!(validate_month("2025-00").is_err());
        assert!(validate_month("2025-1").is_err());
        assert!(validate_month("202501").is_err());
        assert!(validate_month("abcd-ef").is_err());
    }
}
