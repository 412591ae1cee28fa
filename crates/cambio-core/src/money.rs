//! # Money Module
//!
//! Provides the currency-aware [`Money`] value type.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In binary floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  Repeated parse/serialize round trips drift:                        │
//! │    (1.10,USD) → 1.1000000000000001 → (1.10,USD) only by luck       │
//! │                                                                     │
//! │  OUR SOLUTION: rust_decimal::Decimal                                │
//! │    Integer mantissa + scale. (1.10,USD) is exactly 1.10, every     │
//! │    round trip, forever.                                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Precision Tracking
//! A money value carries two precision numbers:
//! - the scale the currency *mandates* (from the registry: 2 for USD, 0 for
//!   JPY), plus
//! - the *extra places* a particular value was given beyond that.
//!
//! `(1.2345,USD)` with USD mandated at 2 keeps `extra_places = 2` so the
//! unusual precision survives a round trip instead of being silently
//! truncated to `(1.23,USD)`.
//!
//! ## Canonical Literal
//! ```text
//! MoneyLiteral := "(" Amount "," CurrencyField ")"
//! Amount       := ["-"] Digits ["." Digits]
//! CurrencyField:= CurrencyCode | "\"\""
//! ```
//! Examples: `(1234.56,USD)`, `(-42.50,EUR)`, `(0.00,"")`.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{MoneyError, MoneyResult, ParseError};
use crate::registry::CurrencyRegistry;
use crate::scale::resolve_scale;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount tagged with its currency and decimal-place bookkeeping.
///
/// Immutable after construction; copies are made with `Clone`. The invariant
/// `decimal_places == mandated_scale(currency) + extra_places` holds for
/// every value this module hands out.
///
/// An empty `currency` means the value was deliberately built without
/// registry resolution (see [`Money::unresolved`]); such values serialize
/// with the `""` currency marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
    decimal_places: u32,
    extra_places: u32,
}

impl Money {
    /// Creates a money value with zero extra precision.
    ///
    /// `currency` of `None` (or an empty string) means "the base currency":
    /// the registry's base-flagged row is resolved once, here, and the value
    /// carries the concrete code from then on.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let price = Money::new(dec!(1234.56), Some("USD"), &registry).await?;
    /// assert_eq!(price.to_literal(), "(1234.56,USD)");
    /// ```
    pub async fn new<R: CurrencyRegistry>(
        amount: Decimal,
        currency: Option<&str>,
        registry: &R,
    ) -> MoneyResult<Money> {
        Money::with_extra_places(amount, currency, 0, registry).await
    }

    /// Creates a money value carrying `extra_places` digits beyond the
    /// currency's mandated scale.
    ///
    /// A supplied code is kept verbatim whether or not the registry knows
    /// it; its mandated scale then resolves through the system default (see
    /// [`resolve_scale`]). Failures are tagged errors - nothing is logged
    /// here and no half-built value escapes.
    pub async fn with_extra_places<R: CurrencyRegistry>(
        amount: Decimal,
        currency: Option<&str>,
        extra_places: u32,
        registry: &R,
    ) -> MoneyResult<Money> {
        let code = match currency.filter(|c| !c.is_empty()) {
            Some(code) => code.to_string(),
            None => registry
                .base_currency()
                .await?
                .ok_or(MoneyError::BaseCurrencyNotSet)?,
        };

        let mandated = resolve_scale(registry, Some(&code)).await?;

        Ok(Money {
            amount,
            currency: code,
            decimal_places: mandated + extra_places,
            extra_places,
        })
    }

    /// Creates a value whose currency was never resolved.
    ///
    /// This is the degraded state an interactive caller may choose after a
    /// failed resolution: empty currency, mandated scale 0, so
    /// `decimal_places == extra_places`. Serializes with the `""` currency
    /// marker. Values in this state should not be persisted as reliable.
    pub fn unresolved(amount: Decimal, extra_places: u32) -> Money {
        Money {
            amount,
            currency: String::new(),
            decimal_places: extra_places,
            extra_places,
        }
    }

    /// Parses the canonical tuple literal.
    ///
    /// The number of fractional digits actually present in the literal is
    /// compared against the currency's mandated scale:
    /// `extra_places = observed - mandated`, clamped at zero. A literal with
    /// *fewer* digits than mandated round-trips zero-padded, never with
    /// negative extra precision.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // USD mandates 2 places; two more were supplied.
    /// let m = Money::parse("(1.2345,USD)", &registry).await?;
    /// assert_eq!(m.extra_places(), 2);
    /// assert_eq!(m.decimal_places(), 4);
    /// ```
    pub async fn parse<R: CurrencyRegistry>(text: &str, registry: &R) -> MoneyResult<Money> {
        let literal = parse_literal(text)?;

        let code = match literal.currency {
            Some(code) => code.to_string(),
            None => registry
                .base_currency()
                .await?
                .ok_or(MoneyError::BaseCurrencyNotSet)?,
        };

        let mandated = resolve_scale(registry, Some(&code)).await?;
        let extra_places = literal.observed_places.saturating_sub(mandated);

        // Idempotent: the literal already has exactly observed_places digits.
        let amount = literal
            .amount
            .round_dp_with_strategy(literal.observed_places, RoundingStrategy::MidpointAwayFromZero);

        Ok(Money {
            amount,
            currency: code,
            decimal_places: mandated + extra_places,
            extra_places,
        })
    }

    /// Creates a money value from an opaque input: either an already-typed
    /// number (an amount in the base currency, zero extra precision) or a
    /// serialized literal.
    pub async fn from_input<R: CurrencyRegistry>(
        input: MoneyInput,
        registry: &R,
    ) -> MoneyResult<Money> {
        match input {
            MoneyInput::Amount(amount) => Money::new(amount, None, registry).await,
            MoneyInput::Text(text) => Money::parse(&text, registry).await,
        }
    }

    /// The amount, exactly as stored.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency code; empty for [`Money::unresolved`] values.
    #[inline]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Total decimal places: mandated scale plus extra places.
    #[inline]
    pub const fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    /// Digits of precision beyond what the currency mandates.
    #[inline]
    pub const fn extra_places(&self) -> u32 {
        self.extra_places
    }

    /// Looks up the registry row id for this value's currency.
    ///
    /// `CurrencyNotFound` when no row matches - a tagged error, not a
    /// sentinel id.
    pub async fn currency_id<R: CurrencyRegistry>(&self, registry: &R) -> MoneyResult<String> {
        registry
            .currency_id(&self.currency)
            .await?
            .ok_or_else(|| MoneyError::CurrencyNotFound {
                code: self.currency.clone(),
            })
    }

    /// Serializes to the canonical tuple literal.
    ///
    /// The amount always carries exactly `decimal_places` fractional digits
    /// (zero-padded), so `parse(to_literal(x))` reconstructs an equivalent
    /// value.
    pub fn to_literal(&self) -> String {
        let currency = if self.currency.is_empty() {
            "\"\""
        } else {
            self.currency.as_str()
        };
        format!(
            "({},{})",
            format_fixed(self.amount, self.decimal_places),
            currency
        )
    }
}

/// Display renders the canonical literal - it IS the storage format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

// =============================================================================
// Money Input
// =============================================================================

/// An opaque money input: a plain number or a serialized literal.
///
/// Deserializes untagged, so a JSON number becomes an amount in the base
/// currency and a JSON string goes through the literal grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoneyInput {
    /// An already-typed amount, in the base currency.
    Amount(Decimal),
    /// A serialized `(amount,currency)` literal.
    Text(String),
}

impl From<Decimal> for MoneyInput {
    fn from(amount: Decimal) -> Self {
        MoneyInput::Amount(amount)
    }
}

impl From<&str> for MoneyInput {
    fn from(text: &str) -> Self {
        MoneyInput::Text(text.to_string())
    }
}

impl From<String> for MoneyInput {
    fn from(text: String) -> Self {
        MoneyInput::Text(text)
    }
}

// =============================================================================
// Literal Parsing & Formatting
// =============================================================================

struct Literal<'a> {
    amount: Decimal,
    observed_places: u32,
    currency: Option<&'a str>,
}

/// Splits and validates one `(amount,currency)` pair.
///
/// The whole (trimmed) input must be the literal; surrounding text is
/// rejected. An empty currency field and the explicit `""` marker both mean
/// "no currency given".
fn parse_literal(text: &str) -> Result<Literal<'_>, ParseError> {
    let inner = text
        .trim()
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or(ParseError::NotALiteral)?;

    let (amount_text, currency_text) = inner.split_once(',').ok_or(ParseError::NotALiteral)?;

    let observed_places = validate_amount_shape(amount_text)?;
    let amount: Decimal = amount_text
        .parse()
        .map_err(|_| ParseError::InvalidAmount {
            text: amount_text.to_string(),
        })?;

    let currency = match currency_text {
        "" | "\"\"" => None,
        code => {
            if code.contains([',', ')', '"']) {
                return Err(ParseError::InvalidCurrency {
                    text: code.to_string(),
                });
            }
            Some(code)
        }
    };

    Ok(Literal {
        amount,
        observed_places,
        currency,
    })
}

/// Checks `["-"] Digits ["." Digits]` and returns the fractional digit count.
fn validate_amount_shape(text: &str) -> Result<u32, ParseError> {
    let invalid = || ParseError::InvalidAmount {
        text: text.to_string(),
    };

    let body = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body, None),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    match frac_part {
        None => Ok(0),
        Some(frac) => {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            Ok(frac.len() as u32)
        }
    }
}

/// Formats an amount with exactly `places` fractional digits, zero-padded,
/// rounding half away from zero when the stored amount carries more.
fn format_fixed(amount: Decimal, places: u32) -> String {
    let rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", places as usize, rounded)
}

// =============================================================================
// Unit Tests
// =============================================================================
