//! # SQL Currency Registry
//!
//! The live [`CurrencyRegistry`] implementation: every lookup is one fresh
//! query against the pool.
//!
//! ## No Cache, By Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Money::new(amount, "EUR", &db.registry())                          │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SqlRegistry.mandated_scale(Some("EUR"))  ── one SELECT ──► SQLite  │
//! │                                                                     │
//! │  Repeated resolutions re-query. Currency metadata edited in the     │
//! │  registry is visible on the very next construction - freshness      │
//! │  over throughput, at interactive-form call frequency.               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Infrastructure failures surface as `RegistryError::QueryFailed`; "no
//! row" stays `Ok(None)` so the core decides what absence means.

use sqlx::SqlitePool;

use crate::error::DbError;
use crate::repository::currency::CurrencyRepository;
use cambio_core::error::RegistryResult;
use cambio_core::{CurrencyRegistry, RegistryError};

/// [`CurrencyRegistry`] backed by the SQLite pool.
///
/// Cheap to construct and clone; hand one to every money-value
/// construction site.
#[derive(Debug, Clone)]
pub struct SqlRegistry {
    pool: SqlitePool,
}

impl SqlRegistry {
    /// Creates a registry over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqlRegistry { pool }
    }
}

fn to_registry_error(err: DbError) -> RegistryError {
    RegistryError::query_failed(err.to_string())
}

impl CurrencyRegistry for SqlRegistry {
    async fn mandated_scale(&self, code: Option<&str>) -> RegistryResult<Option<u32>> {
        // The repository already issues this as a single UNION round trip.
        CurrencyRepository::new(self.pool.clone())
            .mandated_scale(code)
            .await
            .map_err(to_registry_error)
    }

    async fn base_currency(&self) -> RegistryResult<Option<String>> {
        sqlx::query_scalar("SELECT code FROM currencies WHERE is_base")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RegistryError::query_failed(e.to_string()))
    }

    async fn currency_id(&self, code: &str) -> RegistryResult<Option<String>> {
        sqlx::query_scalar("SELECT id FROM currencies WHERE code = ?1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RegistryError::query_failed(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cambio_core::{Money, MoneyError, NewCurrency};
    use rust_decimal_macros::dec;

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let currencies = db.currencies();

        for (code, symbol, name, scale, is_base) in [
            ("USD", "$", "US Dollar", 2u32, true),
            ("EUR", "€", "Euro", 2, false),
            ("JPY", "¥", "Japanese Yen", 0, false),
        ] {
            currencies
                .insert(&NewCurrency {
                    code: code.to_string(),
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    iso_number: None,
                    scale,
                    is_base,
                })
                .await
                .unwrap();
        }

        db
    }

    #[tokio::test]
    async fn test_lookups_against_live_rows() {
        let db = seeded().await;
        let registry = db.registry();

        assert_eq!(
            registry.mandated_scale(Some("JPY")).await.unwrap(),
            Some(0)
        );
        // Unknown code falls through to the seeded SCALE_MONEY default.
        assert_eq!(
            registry.mandated_scale(Some("XXX")).await.unwrap(),
            Some(2)
        );
        assert_eq!(
            registry.base_currency().await.unwrap().as_deref(),
            Some("USD")
        );
        assert!(registry.currency_id("EUR").await.unwrap().is_some());
        assert_eq!(registry.currency_id("XXX").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_money_end_to_end() {
        let db = seeded().await;
        let registry = db.registry();

        // Construction resolves the base currency and scale from live rows.
        let total = Money::new(dec!(1234.5), None, &registry).await.unwrap();
        assert_eq!(total.currency(), "USD");
        assert_eq!(total.to_literal(), "(1234.50,USD)");

        // Round trip through the canonical literal.
        let parsed = Money::parse("(1.2345,EUR)", &registry).await.unwrap();
        assert_eq!(parsed.extra_places(), 2);
        assert_eq!(parsed.to_literal(), "(1.2345,EUR)");

        // The registry id matches the stored row.
        let eur_row = db.currencies().get_by_code("EUR").await.unwrap().unwrap();
        assert_eq!(parsed.currency_id(&registry).await.unwrap(), eur_row.id);
    }

    #[tokio::test]
    async fn test_registry_sees_fresh_edits() {
        let db = seeded().await;
        let registry = db.registry();

        let before = Money::new(dec!(1), Some("EUR"), &registry).await.unwrap();
        assert_eq!(before.decimal_places(), 2);

        let mut eur = db.currencies().get_by_code("EUR").await.unwrap().unwrap();
        eur.scale = 4;
        db.currencies().update(&eur).await.unwrap();

        // No caching: the next construction picks up the new scale.
        let after = Money::new(dec!(1), Some("EUR"), &registry).await.unwrap();
        assert_eq!(after.decimal_places(), 4);
    }

    #[tokio::test]
    async fn test_infrastructure_failure_is_query_failed() {
        let db = seeded().await;
        let registry = db.registry();
        db.close().await;

        let err = registry.mandated_scale(Some("EUR")).await.unwrap_err();
        assert!(matches!(err, RegistryError::QueryFailed { .. }));

        // And it arrives at the money layer as a tagged registry error.
        let err = Money::new(dec!(1), Some("EUR"), &registry).await.unwrap_err();
        assert!(matches!(err, MoneyError::Registry(_)));
    }
}
