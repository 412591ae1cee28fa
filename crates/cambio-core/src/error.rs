//! # Error Types
//!
//! Domain-specific error types for cambio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  cambio-core errors (this file)                                     │
//! │  ├── RegistryError    - Registry lookup infrastructure failures     │
//! │  ├── ParseError       - Money literal grammar violations            │
//! │  ├── MoneyError       - Construction / resolution failures          │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  cambio-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  Flow: RegistryError/ParseError → MoneyError → caller               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (currency code, offending text)
//! 3. Errors are enum variants, never String
//! 4. Resolution never reports-and-continues on its own: the caller gets a
//!    tagged `Result` and decides whether to degrade or abort

use thiserror::Error;

use crate::scale::ScaleKind;

// =============================================================================
// Registry Error
// =============================================================================

/// Infrastructure failure while consulting the currency registry.
///
/// "No matching row" is NOT an error at this level - registry lookups return
/// `Ok(None)` for that, and [`MoneyError`] gives it a name once a caller
/// actually required the row.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The lookup itself failed (connectivity, malformed query, corrupt row).
    #[error("registry query failed: {message}")]
    QueryFailed { message: String },
}

impl RegistryError {
    /// Creates a QueryFailed error from anything displayable.
    pub fn query_failed(message: impl Into<String>) -> Self {
        RegistryError::QueryFailed {
            message: message.into(),
        }
    }
}

// =============================================================================
// Parse Error
// =============================================================================

/// A serialized money literal did not match the grammar.
///
/// ## Grammar
/// ```text
/// MoneyLiteral := "(" Amount "," CurrencyField ")"
/// Amount       := ["-"] Digits ["." Digits]
/// CurrencyField:= CurrencyCode | "\"\""
/// CurrencyCode := any run of characters excluding "," ")" '"'
/// ```
///
/// A failed parse never yields a half-built [`Money`](crate::Money); callers
/// always see one of these variants instead.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input is not a parenthesized `(amount,currency)` pair.
    #[error("not a money literal")]
    NotALiteral,

    /// The amount field is not a plain decimal number.
    #[error("invalid amount in money literal: '{text}'")]
    InvalidAmount { text: String },

    /// The currency field contains characters the grammar excludes.
    #[error("invalid currency in money literal: '{text}'")]
    InvalidCurrency { text: String },
}

// =============================================================================
// Money Error
// =============================================================================

/// Failures while constructing or resolving a money value.
#[derive(Debug, Error)]
pub enum MoneyError {
    /// A currency code has no registry row where one was required.
    ///
    /// ## When This Occurs
    /// - `Money::currency_id` on an unregistered code
    /// - Scale resolution when neither the currency row nor the system
    ///   default scale exists
    #[error("currency not found: {code}")]
    CurrencyNotFound { code: String },

    /// No registry row is flagged as the base currency, but a value was
    /// constructed without an explicit currency.
    #[error("no base currency is configured")]
    BaseCurrencyNotSet,

    /// No system-wide default scale is configured for the given kind.
    #[error("no default scale configured for {kind}")]
    ScaleNotConfigured { kind: ScaleKind },

    /// Registry lookup failed for infrastructural reasons.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A serialized representation did not match the grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation before anything touches the registry or the database.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustBeNonZero { field: String },

    /// Invalid format (forbidden characters, malformed code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A date window is inverted (start after end).
    #[error("{field} starts after it ends")]
    InvertedRange { field: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience alias for money operations.
pub type MoneyResult<T> = Result<T, MoneyError>;

/// Convenience alias for registry lookups.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Convenience alias for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
