//! # cambio-db: Database Layer for cambio
//!
//! This crate provides database access for the cambio currency registry.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        cambio Data Flow                             │
//! │                                                                     │
//! │  Caller (form, report, service)                                     │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                   cambio-db (THIS CRATE)                    │   │
//! │  │                                                             │   │
//! │  │  ┌───────────┐  ┌──────────────┐  ┌────────────────────┐  │   │
//! │  │  │ Database  │  │ Repositories │  │ SqlRegistry        │  │   │
//! │  │  │ (pool.rs) │  │ currency.rs  │  │ (registry.rs)      │  │   │
//! │  │  │           │  │ rate.rs      │  │                    │  │   │
//! │  │  │ SqlitePool│◄─│ settings.rs  │  │ CurrencyRegistry   │  │   │
//! │  │  └───────────┘  └──────────────┘  │ impl for core      │  │   │
//! │  │                                   └────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite Database (WAL mode, embedded migrations)                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (currency, rate, settings)
//! - [`registry`] - The live [`cambio_core::CurrencyRegistry`] implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cambio_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("path/to/cambio.db")).await?;
//!
//! // Maintain the registry
//! let usd = db.currencies().get_by_code("USD").await?;
//!
//! // Construct money values against live registry rows
//! let price = Money::new(dec!(12.5), Some("USD"), &db.registry()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod registry;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};
pub use registry::SqlRegistry;

// Repository re-exports for convenience
pub use repository::currency::CurrencyRepository;
pub use repository::rate::ExchangeRateRepository;
pub use repository::settings::SettingsRepository;
