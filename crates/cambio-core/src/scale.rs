//! # Scale Resolution
//!
//! Decimal-place policy: how many fractional digits a value carries.
//!
//! ## Resolution Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 resolve_scale(registry, code)                       │
//! │                                                                     │
//! │  code supplied ──► per-currency scale registered? ──► use it        │
//! │       │                        │ no                                 │
//! │       │                        ▼                                    │
//! │       │              system default money scale? ──► use it        │
//! │       │                        │ no                                 │
//! │       │                        ▼                                    │
//! │       │              Err(CurrencyNotFound)                          │
//! │       │                                                             │
//! │  no code ──► system default money scale, or                        │
//! │              Err(ScaleNotConfigured)                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Missing configuration is a hard failure, never a silent zero; the
//! defensive zero fallback is a separate, caller-visible choice
//! ([`resolve_scale_or_zero`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{MoneyError, MoneyResult};
use crate::registry::CurrencyRegistry;

// =============================================================================
// Scale Kind
// =============================================================================

/// The system-wide configurable numeric scales.
///
/// Each kind maps to a settings key (`SCALE_MONEY`, `SCALE_QTY`, ...) in the
/// settings store. Prices and costs are displayed with the money scale added
/// on top of their own extra digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    /// Monetary amounts.
    Money,
    /// Item costs (extra digits on top of the money scale).
    Cost,
    /// Percentages.
    Percent,
    /// Purchase prices (extra digits on top of the money scale).
    PurchasePrice,
    /// Quantities.
    Quantity,
    /// Quantity-per ratios.
    QuantityPer,
    /// Sales prices (extra digits on top of the money scale).
    SalesPrice,
    /// Unit-of-measure conversion ratios.
    UomRatio,
    /// Weights.
    Weight,
}

impl ScaleKind {
    /// All kinds, in settings-form order.
    pub const ALL: [ScaleKind; 9] = [
        ScaleKind::Money,
        ScaleKind::Cost,
        ScaleKind::Percent,
        ScaleKind::PurchasePrice,
        ScaleKind::Quantity,
        ScaleKind::QuantityPer,
        ScaleKind::SalesPrice,
        ScaleKind::UomRatio,
        ScaleKind::Weight,
    ];

    /// The settings-store key holding this kind's configured scale.
    pub const fn settings_key(&self) -> &'static str {
        match self {
            ScaleKind::Money => "SCALE_MONEY",
            ScaleKind::Cost => "SCALE_COST",
            ScaleKind::Percent => "SCALE_PERCENT",
            ScaleKind::PurchasePrice => "SCALE_PURCHP",
            ScaleKind::Quantity => "SCALE_QTY",
            ScaleKind::QuantityPer => "SCALE_QTYPER",
            ScaleKind::SalesPrice => "SCALE_SALEP",
            ScaleKind::UomRatio => "SCALE_UOMRATIO",
            ScaleKind::Weight => "SCALE_WEIGHT",
        }
    }

    /// Whether display of this kind adds the money scale to its own digits.
    ///
    /// Costs and prices are configured as *extra* digits beyond the money
    /// scale: with money at 2 and cost at 4, costs display with 6 places.
    pub const fn adds_money_scale(&self) -> bool {
        matches!(
            self,
            ScaleKind::Cost | ScaleKind::PurchasePrice | ScaleKind::SalesPrice
        )
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.settings_key())
    }
}

// =============================================================================
// Scale Settings
// =============================================================================

/// A loaded scale profile: the configured value for every [`ScaleKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleSettings {
    pub money: u32,
    pub cost: u32,
    pub percent: u32,
    pub purchase_price: u32,
    pub quantity: u32,
    pub quantity_per: u32,
    pub sales_price: u32,
    pub uom_ratio: u32,
    pub weight: u32,
}

impl ScaleSettings {
    /// The configured scale for a kind, as stored.
    pub const fn configured(&self, kind: ScaleKind) -> u32 {
        match kind {
            ScaleKind::Money => self.money,
            ScaleKind::Cost => self.cost,
            ScaleKind::Percent => self.percent,
            ScaleKind::PurchasePrice => self.purchase_price,
            ScaleKind::Quantity => self.quantity,
            ScaleKind::QuantityPer => self.quantity_per,
            ScaleKind::SalesPrice => self.sales_price,
            ScaleKind::UomRatio => self.uom_ratio,
            ScaleKind::Weight => self.weight,
        }
    }

    /// The number of places a kind is displayed with.
    ///
    /// Cost and price kinds add the money scale to their configured digits;
    /// everything else displays with its configured value directly.
    pub const fn display_scale(&self, kind: ScaleKind) -> u32 {
        if kind.adds_money_scale() {
            self.money + self.configured(kind)
        } else {
            self.configured(kind)
        }
    }
}

impl Default for ScaleSettings {
    /// The out-of-the-box profile seeded by the initial migration.
    fn default() -> Self {
        ScaleSettings {
            money: 2,
            cost: 4,
            percent: 2,
            purchase_price: 4,
            quantity: 2,
            quantity_per: 6,
            sales_price: 4,
            uom_ratio: 6,
            weight: 2,
        }
    }
}

// =============================================================================
// Currency Scale Resolver
// =============================================================================

/// Resolves the mandated decimal places for a currency code.
///
/// An empty code is treated as absent. The registry applies the
/// currency-row-over-default preference (see
/// [`CurrencyRegistry::mandated_scale`]); this function turns "no row at
/// all" into the appropriate hard failure.
///
/// ## Example
/// ```rust,ignore
/// let registry = MemoryRegistry::new()
///     .with_default_scale(ScaleKind::Money, 2)
///     .with_currency("JPY", 0);
///
/// assert_eq!(resolve_scale(&registry, Some("JPY")).await?, 0);
/// assert_eq!(resolve_scale(&registry, None).await?, 2);
/// ```
pub async fn resolve_scale<R: CurrencyRegistry>(
    registry: &R,
    code: Option<&str>,
) -> MoneyResult<u32> {
    let code = code.filter(|c| !c.is_empty());

    match registry.mandated_scale(code).await? {
        Some(scale) => Ok(scale),
        None => match code {
            Some(code) => Err(MoneyError::CurrencyNotFound {
                code: code.to_string(),
            }),
            None => Err(MoneyError::ScaleNotConfigured {
                kind: ScaleKind::Money,
            }),
        },
    }
}

/// Resolves the mandated scale, degrading to `0` on failure.
///
/// The failure is reported through the diagnostics sink (`tracing`) before
/// the fallback is returned. Interactive callers that must render *something*
/// use this; anything that persists values should call [`resolve_scale`] and
/// handle the error.
pub async fn resolve_scale_or_zero<R: CurrencyRegistry>(registry: &R, code: Option<&str>) -> u32 {
    match resolve_scale(registry, code).await {
        Ok(scale) => scale,
        Err(err) => {
            error!(code = code.unwrap_or(""), %err, "scale resolution failed, using 0");
            0
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;

    fn registry() -> MemoryRegistry {
        MemoryRegistry::new()
            .with_default_scale(ScaleKind::Money, 2)
            .with_base_currency("USD", 2)
            .with_currency("JPY", 0)
    }

    #[tokio::test]
    async fn test_currency_specific_scale_wins() {
        assert_eq!(resolve_scale(&registry(), Some("JPY")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_code_uses_default() {
        assert_eq!(resolve_scale(&registry(), Some("XXX")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_code_is_absent() {
        assert_eq!(resolve_scale(&registry(), Some("")).await.unwrap(), 2);
        assert_eq!(resolve_scale(&registry(), None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unregistered_code_without_default_is_not_found() {
        let reg = MemoryRegistry::new().with_currency("USD", 2);
        let err = resolve_scale(&reg, Some("XXX")).await.unwrap_err();
        assert!(matches!(err, MoneyError::CurrencyNotFound { code } if code == "XXX"));
    }

    #[tokio::test]
    async fn test_no_default_configured() {
        let reg = MemoryRegistry::new();
        let err = resolve_scale(&reg, None).await.unwrap_err();
        assert!(matches!(
            err,
            MoneyError::ScaleNotConfigured {
                kind: ScaleKind::Money
            }
        ));
    }

    #[tokio::test]
    async fn test_fallback_yields_zero() {
        let reg = MemoryRegistry::new();
        assert_eq!(resolve_scale_or_zero(&reg, Some("XXX")).await, 0);
    }

    #[test]
    fn test_settings_keys() {
        assert_eq!(ScaleKind::Money.settings_key(), "SCALE_MONEY");
        assert_eq!(ScaleKind::PurchasePrice.settings_key(), "SCALE_PURCHP");
        assert_eq!(ScaleKind::UomRatio.settings_key(), "SCALE_UOMRATIO");
        assert_eq!(ScaleKind::ALL.len(), 9);
    }

    #[test]
    fn test_display_scale_composition() {
        let settings = ScaleSettings::default();

        // Cost and price kinds add the money scale on top.
        assert_eq!(settings.display_scale(ScaleKind::Cost), 6);
        assert_eq!(settings.display_scale(ScaleKind::PurchasePrice), 6);
        assert_eq!(settings.display_scale(ScaleKind::SalesPrice), 6);

        // Everything else displays as configured.
        assert_eq!(settings.display_scale(ScaleKind::Money), 2);
        assert_eq!(settings.display_scale(ScaleKind::QuantityPer), 6);
        assert_eq!(settings.display_scale(ScaleKind::Weight), 2);
    }
}
