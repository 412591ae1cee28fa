//! # cambio-core: Pure Business Logic for cambio
//!
//! This crate is the **heart** of cambio. It contains the money-value and
//! currency-scale semantics as pure logic with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       cambio Architecture                           │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │              Callers (forms, reports, services)             │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │              ★ cambio-core (THIS CRATE) ★                   │   │
//! │  │                                                             │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌───────────────┐   │   │
//! │  │  │  money  │ │  scale  │ │ registry │ │ types/validate│   │   │
//! │  │  │  Money  │ │ resolve │ │  trait   │ │ Currency,Rate │   │   │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └───────────────┘   │   │
//! │  │                                                             │   │
//! │  │  NO I/O • NO DATABASE • REGISTRY IS AN INJECTED CAPABILITY │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │ CurrencyRegistry                   │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                 cambio-db (Database Layer)                  │   │
//! │  │        SQLite registry, rates, settings, migrations         │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - The currency-aware [`Money`] value and its literal format
//! - [`scale`] - Scale kinds, settings, and the currency scale resolver
//! - [`registry`] - The [`CurrencyRegistry`] capability and an in-memory fake
//! - [`types`] - Registry domain types (Currency, ExchangeRate, ...)
//! - [`error`] - Typed error enums
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **No I/O**: registry access goes through an injected trait; this crate
//!    never opens a connection
//! 2. **Exact decimals**: every amount is a `rust_decimal::Decimal`, never a
//!    binary float
//! 3. **Explicit errors**: construction and resolution return tagged
//!    `Result`s; no value is ever observable in a half-built state
//! 4. **Immutability**: a [`Money`] never changes after construction

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod registry;
pub mod scale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use cambio_core::Money` instead of
// `use cambio_core::money::Money`

pub use error::{MoneyError, ParseError, RegistryError, ValidationError};
pub use money::{Money, MoneyInput};
pub use registry::{CurrencyRegistry, MemoryRegistry};
pub use scale::{resolve_scale, resolve_scale_or_zero, ScaleKind, ScaleSettings};
pub use types::{Currency, ExchangeRate, ExchangeSense, NewCurrency, NewExchangeRate};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum characters in a currency code.
///
/// ISO 4217 abbreviations are 3 characters long; the registry refuses
/// anything longer so codes stay unambiguous in the tuple literal.
pub const MAX_CURRENCY_CODE_LEN: usize = 3;

/// Maximum configurable decimal scale, for currencies and for the
/// system-wide scale settings alike.
pub const MAX_SCALE: u32 = 10;
