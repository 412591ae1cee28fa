//! # Validation Module
//!
//! Input validation for currency and exchange-rate maintenance.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: THIS MODULE - business rule validation                    │
//! │           (required fields, code length, rate sanity)               │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: Database (SQLite)                                         │
//! │           NOT NULL / UNIQUE / CHECK / partial-index constraints     │
//! │                                                                     │
//! │  Defense in depth: both layers catch different mistakes             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{ValidationError, ValidationResult};
use crate::types::NewCurrency;
use crate::{MAX_CURRENCY_CODE_LEN, MAX_SCALE};

// =============================================================================
// Currency Validators
// =============================================================================

/// Validates a currency code.
///
/// ## Rules
/// - Must not be empty
/// - At most 3 characters (ISO codes are 3 characters long)
/// - Must not contain `,` `)` `(` `"` or whitespace - the characters the
///   money-literal grammar reserves
///
/// ## Example
/// ```rust
/// use cambio_core::validation::validate_currency_code;
///
/// assert!(validate_currency_code("USD").is_ok());
/// assert!(validate_currency_code("").is_err());
/// assert!(validate_currency_code("DOLLARS").is_err());
/// ```
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_CURRENCY_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CURRENCY_CODE_LEN,
        });
    }

    if code
        .chars()
        .any(|c| matches!(c, ',' | '(' | ')' | '"') || c.is_whitespace())
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must not contain commas, parentheses, quotes, or spaces".to_string(),
        });
    }

    Ok(())
}

/// Validates a currency insert payload.
///
/// ## Rules
/// - Name is required
/// - Either the code or the symbol must be supplied (both is better)
/// - A supplied code must satisfy [`validate_currency_code`]
/// - The scale must satisfy [`validate_scale`]
pub fn validate_new_currency(currency: &NewCurrency) -> ValidationResult<()> {
    if currency.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if currency.code.trim().is_empty() && currency.symbol.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code or symbol".to_string(),
        });
    }

    if !currency.code.trim().is_empty() {
        validate_currency_code(&currency.code)?;
    }

    validate_scale(currency.scale)
}

// =============================================================================
// Exchange-Rate Validators
// =============================================================================

/// Validates an exchange rate value.
///
/// ## Rules
/// - Must not be zero (a zero rate makes every conversion degenerate and
///   breaks sense inversion)
pub fn validate_rate(rate: Decimal) -> ValidationResult<()> {
    if rate.is_zero() {
        return Err(ValidationError::MustBeNonZero {
            field: "rate".to_string(),
        });
    }

    Ok(())
}

/// Validates a rate validity window.
///
/// ## Rules
/// - The effective date must not be after the expiry date
pub fn validate_rate_window(effective: NaiveDate, expires: NaiveDate) -> ValidationResult<()> {
    if effective > expires {
        return Err(ValidationError::InvertedRange {
            field: "rate window".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Scale Validators
// =============================================================================

/// Validates a configured decimal scale.
///
/// ## Rules
/// - Must be between 0 and [`MAX_SCALE`] places
pub fn validate_scale(scale: u32) -> ValidationResult<()> {
    if scale > MAX_SCALE {
        return Err(ValidationError::OutOfRange {
            field: "scale".to_string(),
            min: 0,
            max: MAX_SCALE as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_currency() -> NewCurrency {
        NewCurrency {
            code: "USD".to_string(),
            symbol: "$".to_string(),
            name: "US Dollar".to_string(),
            iso_number: Some("840".to_string()),
            scale: 2,
            is_base: true,
        }
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("USD").is_ok());
        assert!(validate_currency_code("A").is_ok());
        assert!(validate_currency_code("").is_err());
        assert!(validate_currency_code("   ").is_err());
        assert!(validate_currency_code("EUROS").is_err());
        assert!(validate_currency_code("U,S").is_err());
        assert!(validate_currency_code("U\"S").is_err());
        assert!(validate_currency_code("(A)").is_err());
    }

    #[test]
    fn test_validate_new_currency() {
        assert!(validate_new_currency(&new_currency()).is_ok());

        let mut missing_name = new_currency();
        missing_name.name.clear();
        assert!(validate_new_currency(&missing_name).is_err());

        // Symbol alone is enough when the code is empty.
        let mut symbol_only = new_currency();
        symbol_only.code.clear();
        assert!(validate_new_currency(&symbol_only).is_ok());

        let mut neither = new_currency();
        neither.code.clear();
        neither.symbol.clear();
        assert!(validate_new_currency(&neither).is_err());

        let mut bad_scale = new_currency();
        bad_scale.scale = 11;
        assert!(validate_new_currency(&bad_scale).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(dec!(0.92)).is_ok());
        assert!(validate_rate(dec!(-1.5)).is_ok());
        assert!(validate_rate(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_validate_rate_window() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

        assert!(validate_rate_window(start, end).is_ok());
        assert!(validate_rate_window(start, start).is_ok());
        assert!(validate_rate_window(end, start).is_err());
    }

    #[test]
    fn test_validate_scale() {
        assert!(validate_scale(0).is_ok());
        assert!(validate_scale(10).is_ok());
        assert!(validate_scale(11).is_err());
    }
}
