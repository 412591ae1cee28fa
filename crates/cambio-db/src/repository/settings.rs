//! # Settings Repository
//!
//! The key/value metrics store: system-wide scale configuration and the
//! exchange-rate entry sense.
//!
//! Scale settings use the keys of [`ScaleKind::settings_key`]; the rate
//! entry sense lives under [`EXCHANGE_SENSE_KEY`].

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use cambio_core::scale::{ScaleKind, ScaleSettings};
use cambio_core::types::ExchangeSense;
use cambio_core::validation::validate_scale;

/// Settings key for the exchange-rate entry sense (`"0"` / `"1"`).
pub const EXCHANGE_SENSE_KEY: &str = "CurrencyExchangeSense";

/// Repository for the settings store.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.settings();
///
/// repo.set_scale(ScaleKind::Money, 3).await?;
/// let profile = repo.scales().await?;
/// ```
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Fetches a raw setting value.
    pub async fn value(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Stores a raw setting value (insert-or-update).
    pub async fn set_value(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, value = %value, "Storing setting");

        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?1, ?2) \
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches the configured scale for a kind.
    pub async fn scale(&self, kind: ScaleKind) -> DbResult<Option<u32>> {
        match self.value(kind.settings_key()).await? {
            None => Ok(None),
            Some(value) => {
                let scale = value.trim().parse::<u32>().map_err(|_| {
                    DbError::Internal(format!(
                        "setting {} holds a non-numeric scale: '{value}'",
                        kind.settings_key()
                    ))
                })?;
                Ok(Some(scale))
            }
        }
    }

    /// Stores the configured scale for a kind (validated 0..=10).
    pub async fn set_scale(&self, kind: ScaleKind, scale: u32) -> DbResult<()> {
        validate_scale(scale)?;
        self.set_value(kind.settings_key(), &scale.to_string()).await
    }

    /// Loads the full scale profile.
    ///
    /// Kinds missing from the store keep their out-of-the-box defaults, so
    /// the profile is always total.
    pub async fn scales(&self) -> DbResult<ScaleSettings> {
        let mut profile = ScaleSettings::default();

        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM settings WHERE key LIKE 'SCALE\\_%' ESCAPE '\\'")
                .fetch_all(&self.pool)
                .await?;

        for (key, value) in rows {
            let Some(kind) = ScaleKind::ALL.iter().find(|k| k.settings_key() == key) else {
                continue;
            };
            let Ok(scale) = value.trim().parse::<u32>() else {
                warn!(key = %key, value = %value, "ignoring non-numeric scale setting");
                continue;
            };
            match kind {
                ScaleKind::Money => profile.money = scale,
                ScaleKind::Cost => profile.cost = scale,
                ScaleKind::Percent => profile.percent = scale,
                ScaleKind::PurchasePrice => profile.purchase_price = scale,
                ScaleKind::Quantity => profile.quantity = scale,
                ScaleKind::QuantityPer => profile.quantity_per = scale,
                ScaleKind::SalesPrice => profile.sales_price = scale,
                ScaleKind::UomRatio => profile.uom_ratio = scale,
                ScaleKind::Weight => profile.weight = scale,
            }
        }

        Ok(profile)
    }

    /// Fetches the exchange-rate entry sense.
    ///
    /// Missing or unparseable values fall back to the default
    /// (foreign-per-base); garbage is reported before the fallback.
    pub async fn exchange_sense(&self) -> DbResult<ExchangeSense> {
        match self.value(EXCHANGE_SENSE_KEY).await? {
            None => Ok(ExchangeSense::default()),
            Some(value) => match ExchangeSense::from_setting(&value) {
                Some(sense) => Ok(sense),
                None => {
                    warn!(value = %value, "unrecognized exchange sense setting, using default");
                    Ok(ExchangeSense::default())
                }
            },
        }
    }

    /// Stores the exchange-rate entry sense.
    pub async fn set_exchange_sense(&self, sense: ExchangeSense) -> DbResult<()> {
        self.set_value(EXCHANGE_SENSE_KEY, sense.as_setting()).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_seeded_defaults() {
        let db = db().await;
        let repo = db.settings();

        assert_eq!(repo.scale(ScaleKind::Money).await.unwrap(), Some(2));
        assert_eq!(repo.scale(ScaleKind::QuantityPer).await.unwrap(), Some(6));
        assert_eq!(
            repo.exchange_sense().await.unwrap(),
            ExchangeSense::ForeignPerBase
        );
    }

    #[tokio::test]
    async fn test_value_round_trip() {
        let db = db().await;
        let repo = db.settings();

        assert_eq!(repo.value("CUSTOM").await.unwrap(), None);
        repo.set_value("CUSTOM", "hello").await.unwrap();
        assert_eq!(repo.value("CUSTOM").await.unwrap().as_deref(), Some("hello"));

        // Upsert overwrites.
        repo.set_value("CUSTOM", "world").await.unwrap();
        assert_eq!(repo.value("CUSTOM").await.unwrap().as_deref(), Some("world"));
    }

    #[tokio::test]
    async fn test_scale_round_trip_and_validation() {
        let db = db().await;
        let repo = db.settings();

        repo.set_scale(ScaleKind::Money, 3).await.unwrap();
        assert_eq!(repo.scale(ScaleKind::Money).await.unwrap(), Some(3));

        let err = repo.set_scale(ScaleKind::Money, 11).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_scales_profile() {
        let db = db().await;
        let repo = db.settings();

        repo.set_scale(ScaleKind::Money, 3).await.unwrap();
        repo.set_scale(ScaleKind::Cost, 5).await.unwrap();

        let profile = repo.scales().await.unwrap();
        assert_eq!(profile.money, 3);
        assert_eq!(profile.cost, 5);
        // Untouched kinds keep their seeded values.
        assert_eq!(profile.weight, 2);
        // Display composition picks up the stored profile.
        assert_eq!(profile.display_scale(ScaleKind::Cost), 8);
    }

    #[tokio::test]
    async fn test_exchange_sense_round_trip() {
        let db = db().await;
        let repo = db.settings();

        repo.set_exchange_sense(ExchangeSense::BasePerForeign)
            .await
            .unwrap();
        assert_eq!(
            repo.exchange_sense().await.unwrap(),
            ExchangeSense::BasePerForeign
        );
    }

    #[tokio::test]
    async fn test_exchange_sense_garbage_falls_back() {
        let db = db().await;
        let repo = db.settings();

        repo.set_value(EXCHANGE_SENSE_KEY, "banana").await.unwrap();
        assert_eq!(
            repo.exchange_sense().await.unwrap(),
            ExchangeSense::ForeignPerBase
        );
    }
}
