//! # Exchange Rate Repository
//!
//! Rate validity windows per currency, plus the conversion helpers built on
//! top of them.
//!
//! ## Rate Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │             Windows for one currency never overlap                  │
//! │                                                                     │
//! │  EUR:  [Jan 1 ── Jun 30]=0.92   [Jul 1 ── Dec 31]=0.94              │
//! │                                                                     │
//! │  rate_in_effect(EUR, Aug 14) ──► 0.94   (at most one window hits)   │
//! │                                                                     │
//! │  Inserting [Jun 1 ── Aug 31] ──► RateOverlap                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Direction
//! Stored rates are always foreign units per base unit. The configured
//! [`ExchangeSense`] only flips the number at the operator entry/display
//! boundary:
//!
//! - `from_base`:  base amount × rate → foreign amount
//! - `to_base`:    foreign amount ÷ rate → base amount

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::currency::CurrencyRepository;
use crate::repository::settings::SettingsRepository;
use cambio_core::validation::{validate_rate, validate_rate_window};
use cambio_core::{ExchangeRate, NewExchangeRate};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `exchange_rates` row; the rate column is decimal text.
#[derive(Debug, sqlx::FromRow)]
struct RateRow {
    id: String,
    currency_id: String,
    rate: String,
    effective: NaiveDate,
    expires: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RateRow {
    fn into_rate(self) -> DbResult<ExchangeRate> {
        let rate = parse_stored_rate(&self.rate)?;
        Ok(ExchangeRate {
            id: self.id,
            currency_id: self.currency_id,
            rate,
            effective: self.effective,
            expires: self.expires,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_stored_rate(text: &str) -> DbResult<Decimal> {
    text.parse().map_err(|_| DbError::CorruptDecimal {
        entity: "exchange_rates".to_string(),
        column: "rate".to_string(),
        value: text.to_string(),
    })
}

const SELECT_RATE: &str = "SELECT id, currency_id, rate, effective, expires, created_at, \
     updated_at FROM exchange_rates";

// =============================================================================
// Repository
// =============================================================================

/// Repository for exchange-rate database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.rates();
///
/// repo.insert(&new_rate).await?;
/// let in_base = repo.to_base("EUR", dec!(92), today).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ExchangeRateRepository {
    pool: SqlitePool,
}

impl ExchangeRateRepository {
    /// Creates a new ExchangeRateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExchangeRateRepository { pool }
    }

    /// Inserts a rate window. The rate is taken as the operator entered it
    /// and normalized through the configured exchange sense before storage.
    ///
    /// ## Rules
    /// - Rate must be non-zero, window must not be inverted
    /// - The window must not overlap any other window for the currency
    /// - The currency must exist (foreign key)
    pub async fn insert(&self, new: &NewExchangeRate) -> DbResult<ExchangeRate> {
        validate_rate(new.rate)?;
        validate_rate_window(new.effective, new.expires)?;
        self.ensure_no_overlap(&new.currency_id, None, new.effective, new.expires)
            .await?;

        let sense = SettingsRepository::new(self.pool.clone())
            .exchange_sense()
            .await?;
        let stored = sense.normalize(new.rate);

        debug!(currency_id = %new.currency_id, rate = %stored, "Inserting exchange rate");

        let now = Utc::now();
        let rate = ExchangeRate {
            id: Uuid::new_v4().to_string(),
            currency_id: new.currency_id.clone(),
            rate: stored,
            effective: new.effective,
            expires: new.expires,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO exchange_rates \
             (id, currency_id, rate, effective, expires, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&rate.id)
        .bind(&rate.currency_id)
        .bind(rate.rate.to_string())
        .bind(rate.effective)
        .bind(rate.expires)
        .bind(rate.created_at)
        .bind(rate.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(rate)
    }

    /// Updates a rate window from an operator-entered payload.
    ///
    /// Same rules as insert; the window may stay where it was (the row
    /// being edited is excluded from the overlap check).
    pub async fn update(&self, id: &str, new: &NewExchangeRate) -> DbResult<ExchangeRate> {
        validate_rate(new.rate)?;
        validate_rate_window(new.effective, new.expires)?;
        self.ensure_no_overlap(&new.currency_id, Some(id), new.effective, new.expires)
            .await?;

        let sense = SettingsRepository::new(self.pool.clone())
            .exchange_sense()
            .await?;
        let stored = sense.normalize(new.rate);

        debug!(id = %id, rate = %stored, "Updating exchange rate");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE exchange_rates SET \
                 currency_id = ?2, \
                 rate = ?3, \
                 effective = ?4, \
                 expires = ?5, \
                 updated_at = ?6 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(&new.currency_id)
        .bind(stored.to_string())
        .bind(new.effective)
        .bind(new.expires)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ExchangeRate", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("ExchangeRate", id))
    }

    /// Deletes a rate window.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM exchange_rates WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ExchangeRate", id));
        }

        Ok(())
    }

    /// Gets a rate window by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<ExchangeRate>> {
        let row: Option<RateRow> = sqlx::query_as(&format!("{SELECT_RATE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(RateRow::into_rate).transpose()
    }

    /// Lists a currency's rate windows ordered by effective date.
    pub async fn list_for_currency(&self, currency_id: &str) -> DbResult<Vec<ExchangeRate>> {
        let rows: Vec<RateRow> =
            sqlx::query_as(&format!("{SELECT_RATE} WHERE currency_id = ?1 ORDER BY effective"))
                .bind(currency_id)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(RateRow::into_rate).collect()
    }

    /// A stored rate converted back to the operator's entry form.
    pub async fn rate_as_entered(&self, id: &str) -> DbResult<Decimal> {
        let rate = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("ExchangeRate", id))?;

        let sense = SettingsRepository::new(self.pool.clone())
            .exchange_sense()
            .await?;
        Ok(sense.denormalize(rate.rate))
    }

    /// The stored rate whose window covers the given date, if any.
    ///
    /// Windows never overlap, so at most one row can match.
    pub async fn rate_in_effect(
        &self,
        currency_id: &str,
        on: NaiveDate,
    ) -> DbResult<Option<Decimal>> {
        let rate: Option<String> = sqlx::query_scalar(
            "SELECT rate FROM exchange_rates \
             WHERE currency_id = ?1 AND effective <= ?2 AND expires >= ?2",
        )
        .bind(currency_id)
        .bind(on)
        .fetch_optional(&self.pool)
        .await?;

        rate.as_deref().map(parse_stored_rate).transpose()
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    /// Converts an amount in `code` to the base currency at the given date.
    ///
    /// The base currency converts at identity without touching the rate
    /// table.
    pub async fn to_base(&self, code: &str, amount: Decimal, on: NaiveDate) -> DbResult<Decimal> {
        let (currency, rate) = self.currency_and_rate(code, on).await?;
        match rate {
            None => Ok(amount), // base currency
            Some(rate) => {
                debug!(code = %currency.code, %rate, %on, "Converting to base");
                Ok(amount / rate)
            }
        }
    }

    /// Converts a base-currency amount into `code` at the given date.
    pub async fn from_base(&self, code: &str, amount: Decimal, on: NaiveDate) -> DbResult<Decimal> {
        let (currency, rate) = self.currency_and_rate(code, on).await?;
        match rate {
            None => Ok(amount), // base currency
            Some(rate) => {
                debug!(code = %currency.code, %rate, %on, "Converting from base");
                Ok(amount * rate)
            }
        }
    }

    /// Converts between two currencies at the given date, through the base.
    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        on: NaiveDate,
    ) -> DbResult<Decimal> {
        let in_base = self.to_base(from, amount, on).await?;
        self.from_base(to, in_base, on).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Resolves a currency by code together with its in-effect rate.
    ///
    /// `Ok((currency, None))` means the code is the base currency; any other
    /// currency without a covering window is `RateNotFound`.
    async fn currency_and_rate(
        &self,
        code: &str,
        on: NaiveDate,
    ) -> DbResult<(cambio_core::Currency, Option<Decimal>)> {
        let currency = CurrencyRepository::new(self.pool.clone())
            .get_by_code(code)
            .await?
            .ok_or_else(|| DbError::not_found("Currency", code))?;

        if currency.is_base {
            return Ok((currency, None));
        }

        let rate = self
            .rate_in_effect(&currency.id, on)
            .await?
            .ok_or(DbError::RateNotFound {
                code: code.to_string(),
                on,
            })?;

        Ok((currency, Some(rate)))
    }

    /// Rejects a window that overlaps any other window for the currency.
    ///
    /// Overlap means: either endpoint falls inside an existing window, or
    /// the new window contains an existing one entirely.
    async fn ensure_no_overlap(
        &self,
        currency_id: &str,
        exclude_id: Option<&str>,
        effective: NaiveDate,
        expires: NaiveDate,
    ) -> DbResult<()> {
        let overlap: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 \
               FROM exchange_rates \
              WHERE currency_id = ?1 \
                AND id != ?2 \
                AND ((effective BETWEEN ?3 AND ?4 OR \
                      expires BETWEEN ?3 AND ?4) \
                  OR (effective <= ?3 AND expires >= ?4)))",
        )
        .bind(currency_id)
        .bind(exclude_id.unwrap_or(""))
        .bind(effective)
        .bind(expires)
        .fetch_one(&self.pool)
        .await?;

        if overlap {
            return Err(DbError::RateOverlap {
                currency_id: currency_id.to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use cambio_core::{ExchangeSense, NewCurrency};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(currency_id: &str, rate: Decimal, from: NaiveDate, to: NaiveDate) -> NewExchangeRate {
        NewExchangeRate {
            currency_id: currency_id.to_string(),
            rate,
            effective: from,
            expires: to,
        }
    }

    /// In-memory database seeded with USD (base), EUR and JPY.
    async fn seeded() -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let currencies = db.currencies();

        currencies
            .insert(&NewCurrency {
                code: "USD".to_string(),
                symbol: "$".to_string(),
                name: "US Dollar".to_string(),
                iso_number: Some("840".to_string()),
                scale: 2,
                is_base: true,
            })
            .await
            .unwrap();
        let eur = currencies
            .insert(&NewCurrency {
                code: "EUR".to_string(),
                symbol: "€".to_string(),
                name: "Euro".to_string(),
                iso_number: Some("978".to_string()),
                scale: 2,
                is_base: false,
            })
            .await
            .unwrap();
        let jpy = currencies
            .insert(&NewCurrency {
                code: "JPY".to_string(),
                symbol: "¥".to_string(),
                name: "Japanese Yen".to_string(),
                iso_number: Some("392".to_string()),
                scale: 0,
                is_base: false,
            })
            .await
            .unwrap();

        (db, eur.id, jpy.id)
    }

    #[tokio::test]
    async fn test_insert_and_rate_in_effect() {
        let (db, eur_id, _) = seeded().await;
        let repo = db.rates();

        repo.insert(&window(
            &eur_id,
            dec!(0.9),
            date(2024, 1, 1),
            date(2024, 6, 30),
        ))
        .await
        .unwrap();

        assert_eq!(
            repo.rate_in_effect(&eur_id, date(2024, 3, 15)).await.unwrap(),
            Some(dec!(0.9))
        );
        // Window edges are inclusive.
        assert_eq!(
            repo.rate_in_effect(&eur_id, date(2024, 6, 30)).await.unwrap(),
            Some(dec!(0.9))
        );
        assert_eq!(
            repo.rate_in_effect(&eur_id, date(2024, 7, 1)).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_overlap_rejected() {
        let (db, eur_id, jpy_id) = seeded().await;
        let repo = db.rates();

        repo.insert(&window(
            &eur_id,
            dec!(0.9),
            date(2024, 1, 1),
            date(2024, 6, 30),
        ))
        .await
        .unwrap();

        // Adjacent window is fine.
        repo.insert(&window(
            &eur_id,
            dec!(0.94),
            date(2024, 7, 1),
            date(2024, 12, 31),
        ))
        .await
        .unwrap();

        // Straddling an existing window is not.
        let err = repo
            .insert(&window(
                &eur_id,
                dec!(0.91),
                date(2024, 6, 1),
                date(2024, 8, 31),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::RateOverlap { .. }));

        // Containing an existing window entirely is not either.
        let err = repo
            .insert(&window(
                &eur_id,
                dec!(0.91),
                date(2023, 12, 1),
                date(2025, 1, 31),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::RateOverlap { .. }));

        // A different currency may use the same window.
        repo.insert(&window(
            &jpy_id,
            dec!(150),
            date(2024, 1, 1),
            date(2024, 6, 30),
        ))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_update_excludes_own_window() {
        let (db, eur_id, _) = seeded().await;
        let repo = db.rates();

        let rate = repo
            .insert(&window(
                &eur_id,
                dec!(0.9),
                date(2024, 1, 1),
                date(2024, 6, 30),
            ))
            .await
            .unwrap();

        // Re-saving over its own window is allowed.
        let updated = repo
            .update(
                &rate.id,
                &window(&eur_id, dec!(0.92), date(2024, 1, 1), date(2024, 6, 30)),
            )
            .await
            .unwrap();
        assert_eq!(updated.rate, dec!(0.92));

        let err = repo
            .update(
                "no-such-id",
                &window(&eur_id, dec!(0.92), date(2025, 1, 1), date(2025, 6, 30)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_validation_rules() {
        let (db, eur_id, _) = seeded().await;
        let repo = db.rates();

        let err = repo
            .insert(&window(
                &eur_id,
                Decimal::ZERO,
                date(2024, 1, 1),
                date(2024, 6, 30),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = repo
            .insert(&window(
                &eur_id,
                dec!(0.9),
                date(2024, 6, 30),
                date(2024, 1, 1),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_currency_fk() {
        let (db, _, _) = seeded().await;
        let repo = db.rates();

        let err = repo
            .insert(&window(
                "no-such-currency",
                dec!(0.9),
                date(2024, 1, 1),
                date(2024, 6, 30),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_sense_normalization() {
        let (db, eur_id, _) = seeded().await;
        db.settings()
            .set_exchange_sense(ExchangeSense::BasePerForeign)
            .await
            .unwrap();

        let repo = db.rates();
        let rate = repo
            .insert(&window(
                &eur_id,
                dec!(1.25),
                date(2024, 1, 1),
                date(2024, 12, 31),
            ))
            .await
            .unwrap();

        // Entered 1.25 base-per-foreign, stored 0.8 foreign-per-base.
        assert_eq!(rate.rate, dec!(0.8));
        assert_eq!(repo.rate_as_entered(&rate.id).await.unwrap(), dec!(1.25));
    }

    #[tokio::test]
    async fn test_conversions() {
        let (db, eur_id, jpy_id) = seeded().await;
        let repo = db.rates();
        let on = date(2024, 3, 15);

        repo.insert(&window(
            &eur_id,
            dec!(0.9),
            date(2024, 1, 1),
            date(2024, 12, 31),
        ))
        .await
        .unwrap();
        repo.insert(&window(
            &jpy_id,
            dec!(150),
            date(2024, 1, 1),
            date(2024, 12, 31),
        ))
        .await
        .unwrap();

        // The base currency converts at identity.
        assert_eq!(repo.to_base("USD", dec!(42), on).await.unwrap(), dec!(42));
        assert_eq!(repo.from_base("USD", dec!(42), on).await.unwrap(), dec!(42));

        // 100 base units buy 90 EUR; 90 EUR are worth 100 base units.
        assert_eq!(
            repo.from_base("EUR", dec!(100), on).await.unwrap(),
            dec!(90)
        );
        assert_eq!(repo.to_base("EUR", dec!(90), on).await.unwrap(), dec!(100));

        // Cross conversion goes through the base: 90 EUR → 15000 JPY.
        assert_eq!(
            repo.convert("EUR", "JPY", dec!(90), on).await.unwrap(),
            dec!(15000)
        );

        // Outside every window.
        let err = repo
            .to_base("EUR", dec!(1), date(2023, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::RateNotFound { code, .. } if code == "EUR"));

        // Unknown code.
        let err = repo.to_base("XXX", dec!(1), on).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let (db, eur_id, _) = seeded().await;
        let repo = db.rates();

        let first = repo
            .insert(&window(
                &eur_id,
                dec!(0.9),
                date(2024, 7, 1),
                date(2024, 12, 31),
            ))
            .await
            .unwrap();
        repo.insert(&window(
            &eur_id,
            dec!(0.88),
            date(2024, 1, 1),
            date(2024, 6, 30),
        ))
        .await
        .unwrap();

        let windows = repo.list_for_currency(&eur_id).await.unwrap();
        assert_eq!(windows.len(), 2);
        // Ordered by effective date.
        assert_eq!(windows[0].rate, dec!(0.88));
        assert_eq!(windows[1].rate, dec!(0.9));

        repo.delete(&first.id).await.unwrap();
        assert_eq!(repo.list_for_currency(&eur_id).await.unwrap().len(), 1);

        let err = repo.delete(&first.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
