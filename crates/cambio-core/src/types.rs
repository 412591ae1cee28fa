//! # Domain Types
//!
//! Registry domain types: currencies, exchange rates, and the exchange-rate
//! entry sense.
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: the currency code - human-readable, what operators type

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Currency
// =============================================================================

/// A currency row from the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Short code, ISO-style (e.g. "USD"). Unique per registry.
    pub code: String,

    /// Display symbol (e.g. "$"). May be empty when only a code exists.
    pub symbol: String,

    /// Full display name (e.g. "US Dollar").
    pub name: String,

    /// Numeric ISO 4217 identifier, when known (e.g. "840").
    pub iso_number: Option<String>,

    /// Mandated number of decimal places for amounts in this currency.
    pub scale: u32,

    /// Whether this is the registry's single base currency.
    pub is_base: bool,

    /// When the row was created.
    pub created_at: DateTime<Utc>,

    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Currency {
    /// Display label combining code and symbol: `USD ($)`, or just the code
    /// when there is no symbol.
    pub fn label(&self) -> String {
        if self.symbol.is_empty() {
            self.code.clone()
        } else {
            format!("{} ({})", self.code, self.symbol)
        }
    }
}

/// Payload for inserting a currency. Id and timestamps are generated by the
/// persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCurrency {
    pub code: String,
    pub symbol: String,
    pub name: String,
    pub iso_number: Option<String>,
    pub scale: u32,
    pub is_base: bool,
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// An exchange-rate validity window for a currency.
///
/// `rate` is always stored normalized: foreign units per one unit of the
/// base currency, regardless of how the operator entered it (see
/// [`ExchangeSense`]). Windows for the same currency never overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The currency this rate converts to/from the base.
    pub currency_id: String,

    /// Foreign units per base unit.
    pub rate: Decimal,

    /// First day the rate is in effect (inclusive).
    pub effective: NaiveDate,

    /// Last day the rate is in effect (inclusive).
    pub expires: NaiveDate,

    /// When the row was created.
    pub created_at: DateTime<Utc>,

    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Payload for inserting an exchange rate. The rate is as entered by the
/// operator; the persistence layer normalizes it through the configured
/// [`ExchangeSense`] before storing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExchangeRate {
    pub currency_id: String,
    pub rate: Decimal,
    pub effective: NaiveDate,
    pub expires: NaiveDate,
}

// =============================================================================
// Exchange Sense
// =============================================================================

/// How operators enter (and read back) exchange rates.
///
/// Storage is always foreign-per-base; the sense only flips the rate at the
/// entry/display boundary.
///
/// ```text
/// ForeignPerBase:  operator enters 1 USD = 0.92 EUR  → stored 0.92
/// BasePerForeign:  operator enters 1 EUR = 1.09 USD  → stored 1/1.09
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeSense {
    /// Rates are entered as foreign units per base unit (stored directly).
    #[default]
    ForeignPerBase,
    /// Rates are entered as base units per foreign unit (stored inverted).
    BasePerForeign,
}

impl ExchangeSense {
    /// Parses the settings-store representation (`"0"` / `"1"`).
    pub fn from_setting(value: &str) -> Option<ExchangeSense> {
        match value.trim() {
            "0" => Some(ExchangeSense::ForeignPerBase),
            "1" => Some(ExchangeSense::BasePerForeign),
            _ => None,
        }
    }

    /// The settings-store representation.
    pub const fn as_setting(&self) -> &'static str {
        match self {
            ExchangeSense::ForeignPerBase => "0",
            ExchangeSense::BasePerForeign => "1",
        }
    }

    /// Converts an operator-entered rate to storage form.
    ///
    /// The entered rate must be non-zero (validated before this is called).
    pub fn normalize(&self, entered: Decimal) -> Decimal {
        match self {
            ExchangeSense::ForeignPerBase => entered,
            ExchangeSense::BasePerForeign => Decimal::ONE / entered,
        }
    }

    /// Converts a stored rate back to the operator's entry form.
    pub fn denormalize(&self, stored: Decimal) -> Decimal {
        // Inversion is its own inverse; the two directions share one flip.
        self.normalize(stored)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
