//! # Currency Registry
//!
//! The registry is the external store of currency metadata (code, symbol,
//! name, scale, base flag). This crate only ever *consumes* it, through the
//! [`CurrencyRegistry`] trait, and never owns its lifecycle.
//!
//! ## Capability Injection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Registry as a Capability                        │
//! │                                                                     │
//! │  Money::new(amount, currency, &registry)                            │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  CurrencyRegistry trait  ← THIS MODULE                              │
//! │       │                                                             │
//! │       ├── MemoryRegistry   (this crate, deterministic tests)        │
//! │       └── SqlRegistry      (cambio-db, live SQLite lookups)         │
//! │                                                                     │
//! │  One query per call. No cache. Freshness over throughput:           │
//! │  resolution happens at interactive-form frequency, not in a         │
//! │  hot path.                                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "Row not found" is data (`Ok(None)`), not an error; infrastructure
//! failures are `Err(RegistryError)`. The caller chooses what each means.

use std::collections::HashMap;

use crate::error::RegistryResult;
use crate::scale::ScaleKind;

// =============================================================================
// CurrencyRegistry Trait
// =============================================================================

/// Read-only access to currency metadata.
///
/// Every method performs one synchronous round trip against the backing
/// store per call; implementations must not cache between calls.
///
/// ## Contract
/// - `mandated_scale(Some(code))`: the per-currency scale when `code` is
///   registered, otherwise the system default money scale, otherwise `None`.
///   The currency-specific row always wins over the default.
/// - `mandated_scale(None)`: the system default money scale, or `None`.
/// - `base_currency()`: the code of the row flagged as base, or `None`.
/// - `currency_id(code)`: the registry row id for `code`, or `None`.
#[allow(async_fn_in_trait)]
pub trait CurrencyRegistry {
    /// Resolves the number of decimal places mandated for a currency.
    async fn mandated_scale(&self, code: Option<&str>) -> RegistryResult<Option<u32>>;

    /// Resolves the code of the base currency.
    async fn base_currency(&self) -> RegistryResult<Option<String>>;

    /// Resolves the registry row id for a currency code.
    async fn currency_id(&self, code: &str) -> RegistryResult<Option<String>>;
}

// =============================================================================
// MemoryRegistry
// =============================================================================

/// Deterministic in-memory registry for tests and examples.
///
/// ## Usage
/// ```rust
/// use cambio_core::registry::MemoryRegistry;
/// use cambio_core::scale::ScaleKind;
///
/// let registry = MemoryRegistry::new()
///     .with_default_scale(ScaleKind::Money, 2)
///     .with_base_currency("USD", 2)
///     .with_currency("JPY", 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    currencies: HashMap<String, MemoryCurrency>,
    base: Option<String>,
    default_scales: HashMap<ScaleKind, u32>,
}

#[derive(Debug, Clone)]
struct MemoryCurrency {
    id: String,
    scale: u32,
}

impl MemoryRegistry {
    /// Creates an empty registry: no currencies, no base, no defaults.
    pub fn new() -> Self {
        MemoryRegistry::default()
    }

    /// Registers a currency with its mandated scale.
    ///
    /// The row id is derived from the code (`cur-usd` for `USD`), stable
    /// across calls so tests can assert on it.
    pub fn with_currency(mut self, code: &str, scale: u32) -> Self {
        self.currencies.insert(
            code.to_string(),
            MemoryCurrency {
                id: format!("cur-{}", code.to_lowercase()),
                scale,
            },
        );
        self
    }

    /// Registers a currency and flags it as the base currency.
    pub fn with_base_currency(mut self, code: &str, scale: u32) -> Self {
        self.base = Some(code.to_string());
        self.with_currency(code, scale)
    }

    /// Sets a system-wide default scale for a kind.
    pub fn with_default_scale(mut self, kind: ScaleKind, scale: u32) -> Self {
        self.default_scales.insert(kind, scale);
        self
    }
}

impl CurrencyRegistry for MemoryRegistry {
    async fn mandated_scale(&self, code: Option<&str>) -> RegistryResult<Option<u32>> {
        // Currency-specific row wins over the system default.
        if let Some(code) = code {
            if let Some(currency) = self.currencies.get(code) {
                return Ok(Some(currency.scale));
            }
        }
        Ok(self.default_scales.get(&ScaleKind::Money).copied())
    }

    async fn base_currency(&self) -> RegistryResult<Option<String>> {
        Ok(self.base.clone())
    }

    async fn currency_id(&self, code: &str) -> RegistryResult<Option<String>> {
        Ok(self.currencies.get(code).map(|c| c.id.clone()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
