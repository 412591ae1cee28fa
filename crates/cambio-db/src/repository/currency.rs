//! # Currency Repository
//!
//! Database operations for the currency registry.
//!
//! ## Key Operations
//! - CRUD over the `currencies` table
//! - Base-currency rules (exactly one, never revoked)
//! - The single-round-trip mandated-scale lookup
//!
//! ## Mandated-Scale Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              How mandated_scale("EUR") Works                        │
//! │                                                                     │
//! │  One query, two candidate rows, priority ordering:                  │
//! │                                                                     │
//! │    SELECT default money scale   AS scale, 2 AS seq                  │
//! │    UNION ALL                                                        │
//! │    SELECT currencies.scale      AS scale, 1 AS seq  (code match)    │
//! │    ORDER BY seq LIMIT 1                                             │
//! │                                                                     │
//! │  Registered code  → its row wins (seq 1)                            │
//! │  Unknown code     → the system default answers (seq 2)              │
//! │  Nothing at all   → no row; the caller decides what that means      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use cambio_core::scale::ScaleKind;
use cambio_core::validation::validate_new_currency;
use cambio_core::{Currency, NewCurrency};

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `currencies` row; converted into the core domain type.
#[derive(Debug, sqlx::FromRow)]
struct CurrencyRow {
    id: String,
    code: String,
    symbol: String,
    name: String,
    iso_number: Option<String>,
    scale: i64,
    is_base: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CurrencyRow> for Currency {
    fn from(row: CurrencyRow) -> Self {
        Currency {
            id: row.id,
            code: row.code,
            symbol: row.symbol,
            name: row.name,
            iso_number: row.iso_number,
            scale: row.scale as u32,
            is_base: row.is_base,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_CURRENCY: &str = "SELECT id, code, symbol, name, iso_number, scale, is_base, \
     created_at, updated_at FROM currencies";

// =============================================================================
// Repository
// =============================================================================

/// Repository for currency database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.currencies();
///
/// let usd = repo.get_by_code("USD").await?;
/// let scale = repo.mandated_scale(Some("USD")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CurrencyRepository {
    pool: SqlitePool,
}

impl CurrencyRepository {
    /// Creates a new CurrencyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CurrencyRepository { pool }
    }

    /// Inserts a new currency.
    ///
    /// ## Rules
    /// - Payload must pass [`validate_new_currency`]
    /// - A second base-flagged row is refused (`BaseCurrencyAlreadySet`)
    /// - A duplicate code maps to `UniqueViolation`
    pub async fn insert(&self, new: &NewCurrency) -> DbResult<Currency> {
        validate_new_currency(new)?;

        if new.is_base && self.has_base().await? {
            return Err(DbError::BaseCurrencyAlreadySet);
        }

        debug!(code = %new.code, "Inserting currency");

        let now = Utc::now();
        let currency = Currency {
            id: Uuid::new_v4().to_string(),
            code: new.code.trim().to_string(),
            symbol: new.symbol.trim().to_string(),
            name: new.name.trim().to_string(),
            iso_number: new.iso_number.clone(),
            scale: new.scale,
            is_base: new.is_base,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO currencies \
             (id, code, symbol, name, iso_number, scale, is_base, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&currency.id)
        .bind(&currency.code)
        .bind(&currency.symbol)
        .bind(&currency.name)
        .bind(&currency.iso_number)
        .bind(currency.scale as i64)
        .bind(currency.is_base)
        .bind(currency.created_at)
        .bind(currency.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(currency)
    }

    /// Updates an existing currency.
    ///
    /// ## Rules
    /// - Same field validation as insert
    /// - The base flag can be granted only while no base exists, and once a
    ///   row carries it the flag cannot be removed
    pub async fn update(&self, currency: &Currency) -> DbResult<()> {
        let payload = NewCurrency {
            code: currency.code.clone(),
            symbol: currency.symbol.clone(),
            name: currency.name.clone(),
            iso_number: currency.iso_number.clone(),
            scale: currency.scale,
            is_base: currency.is_base,
        };
        validate_new_currency(&payload)?;

        let current = self
            .get_by_id(&currency.id)
            .await?
            .ok_or_else(|| DbError::not_found("Currency", &currency.id))?;

        if current.is_base && !currency.is_base {
            return Err(DbError::BaseCurrencyImmutable {
                code: current.code.clone(),
            });
        }
        if !current.is_base && currency.is_base && self.has_base().await? {
            return Err(DbError::BaseCurrencyAlreadySet);
        }

        debug!(id = %currency.id, code = %currency.code, "Updating currency");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE currencies SET \
                 code = ?2, \
                 symbol = ?3, \
                 name = ?4, \
                 iso_number = ?5, \
                 scale = ?6, \
                 is_base = ?7, \
                 updated_at = ?8 \
             WHERE id = ?1",
        )
        .bind(&currency.id)
        .bind(currency.code.trim())
        .bind(currency.symbol.trim())
        .bind(currency.name.trim())
        .bind(&currency.iso_number)
        .bind(currency.scale as i64)
        .bind(currency.is_base)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Currency", &currency.id));
        }

        Ok(())
    }

    /// Gets a currency by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Currency>> {
        let row: Option<CurrencyRow> =
            sqlx::query_as(&format!("{SELECT_CURRENCY} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Currency::from))
    }

    /// Gets a currency by its code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Currency>> {
        let row: Option<CurrencyRow> =
            sqlx::query_as(&format!("{SELECT_CURRENCY} WHERE code = ?1"))
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Currency::from))
    }

    /// Lists all currencies ordered by code.
    pub async fn list(&self) -> DbResult<Vec<Currency>> {
        let rows: Vec<CurrencyRow> =
            sqlx::query_as(&format!("{SELECT_CURRENCY} ORDER BY code"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Currency::from).collect())
    }

    /// Lists the non-base currencies ordered by code.
    ///
    /// Rate maintenance uses this: the base currency has no rate windows.
    pub async fn list_non_base(&self) -> DbResult<Vec<Currency>> {
        let rows: Vec<CurrencyRow> =
            sqlx::query_as(&format!("{SELECT_CURRENCY} WHERE NOT is_base ORDER BY code"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Currency::from).collect())
    }

    /// Gets the base currency, if one is configured.
    pub async fn base(&self) -> DbResult<Option<Currency>> {
        let row: Option<CurrencyRow> =
            sqlx::query_as(&format!("{SELECT_CURRENCY} WHERE is_base"))
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Currency::from))
    }

    /// Checks whether any row carries the base flag.
    pub async fn has_base(&self) -> DbResult<bool> {
        let has_base: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM currencies WHERE is_base)")
                .fetch_one(&self.pool)
                .await?;

        Ok(has_base)
    }

    /// Resolves the mandated scale for a currency code in one round trip.
    ///
    /// The currency-specific row wins over the system default money scale;
    /// `None` only when neither exists. An absent or empty code skips the
    /// currency leg and asks for the default alone.
    pub async fn mandated_scale(&self, code: Option<&str>) -> DbResult<Option<u32>> {
        let scale: Option<i64> = match code.filter(|c| !c.is_empty()) {
            Some(code) => {
                sqlx::query_scalar(
                    "SELECT scale FROM ( \
                         SELECT CAST(value AS INTEGER) AS scale, 2 AS seq \
                           FROM settings WHERE key = ?2 \
                         UNION ALL \
                         SELECT scale AS scale, 1 AS seq \
                           FROM currencies WHERE code = ?1 \
                     ) ORDER BY seq LIMIT 1",
                )
                .bind(code)
                .bind(ScaleKind::Money.settings_key())
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT CAST(value AS INTEGER) FROM settings WHERE key = ?1",
                )
                .bind(ScaleKind::Money.settings_key())
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(scale.map(|s| s as u32))
    }

    /// Counts currencies (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM currencies")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
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

    fn currency(code: &str, scale: u32, is_base: bool) -> NewCurrency {
        NewCurrency {
            code: code.to_string(),
            symbol: String::new(),
            name: format!("{code} test currency"),
            iso_number: None,
            scale,
            is_base,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let repo = db.currencies();

        let inserted = repo.insert(&currency("USD", 2, true)).await.unwrap();

        let by_code = repo.get_by_code("USD").await.unwrap().unwrap();
        assert_eq!(by_code.id, inserted.id);
        assert_eq!(by_code.name, inserted.name);

        let by_id = repo.get_by_id(&inserted.id).await.unwrap().unwrap();
        assert_eq!(by_id.code, "USD");
        assert_eq!(by_id.scale, 2);
        assert!(by_id.is_base);

        assert!(repo.get_by_code("EUR").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = db().await;
        let repo = db.currencies();

        repo.insert(&currency("USD", 2, true)).await.unwrap();
        let err = repo.insert(&currency("USD", 2, false)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_invalid_payload_rejected() {
        let db = db().await;
        let repo = db.currencies();

        let err = repo.insert(&currency("DOLLARS", 2, false)).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_single_base_currency() {
        let db = db().await;
        let repo = db.currencies();

        repo.insert(&currency("USD", 2, true)).await.unwrap();
        let err = repo.insert(&currency("EUR", 2, true)).await.unwrap_err();
        assert!(matches!(err, DbError::BaseCurrencyAlreadySet));

        assert!(repo.has_base().await.unwrap());
        assert_eq!(repo.base().await.unwrap().unwrap().code, "USD");
    }

    #[tokio::test]
    async fn test_base_flag_rules_on_update() {
        let db = db().await;
        let repo = db.currencies();

        let usd = repo.insert(&currency("USD", 2, true)).await.unwrap();
        let eur = repo.insert(&currency("EUR", 2, false)).await.unwrap();

        // The flag cannot be revoked.
        let mut demoted = usd.clone();
        demoted.is_base = false;
        let err = repo.update(&demoted).await.unwrap_err();
        assert!(matches!(err, DbError::BaseCurrencyImmutable { code } if code == "USD"));

        // Nor granted while another row holds it.
        let mut promoted = eur.clone();
        promoted.is_base = true;
        let err = repo.update(&promoted).await.unwrap_err();
        assert!(matches!(err, DbError::BaseCurrencyAlreadySet));

        // Plain field edits go through.
        let mut renamed = eur;
        renamed.name = "Euro".to_string();
        renamed.symbol = "€".to_string();
        repo.update(&renamed).await.unwrap();
        let reloaded = repo.get_by_code("EUR").await.unwrap().unwrap();
        assert_eq!(reloaded.name, "Euro");
        assert_eq!(reloaded.label(), "EUR (€)");
    }

    #[tokio::test]
    async fn test_grant_base_when_none_exists() {
        let db = db().await;
        let repo = db.currencies();

        let eur = repo.insert(&currency("EUR", 2, false)).await.unwrap();

        let mut promoted = eur;
        promoted.is_base = true;
        repo.update(&promoted).await.unwrap();
        assert_eq!(repo.base().await.unwrap().unwrap().code, "EUR");
    }

    #[tokio::test]
    async fn test_mandated_scale_priority() {
        let db = db().await;
        let repo = db.currencies();

        repo.insert(&currency("JPY", 0, false)).await.unwrap();

        // Currency row wins over the seeded default of 2.
        assert_eq!(repo.mandated_scale(Some("JPY")).await.unwrap(), Some(0));

        // Unknown code falls back to the system default.
        assert_eq!(repo.mandated_scale(Some("XXX")).await.unwrap(), Some(2));

        // Absent/empty code asks for the default alone.
        assert_eq!(repo.mandated_scale(None).await.unwrap(), Some(2));
        assert_eq!(repo.mandated_scale(Some("")).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_mandated_scale_nothing_configured() {
        let db = db().await;
        let repo = db.currencies();

        sqlx::query("DELETE FROM settings WHERE key = 'SCALE_MONEY'")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(repo.mandated_scale(Some("XXX")).await.unwrap(), None);
        assert_eq!(repo.mandated_scale(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_ordering_and_non_base() {
        let db = db().await;
        let repo = db.currencies();

        repo.insert(&currency("USD", 2, true)).await.unwrap();
        repo.insert(&currency("JPY", 0, false)).await.unwrap();
        repo.insert(&currency("EUR", 2, false)).await.unwrap();

        let all: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(all, vec!["EUR", "JPY", "USD"]);

        let non_base: Vec<String> = repo
            .list_non_base()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(non_base, vec!["EUR", "JPY"]);

        assert_eq!(repo.count().await.unwrap(), 3);
    }
}
