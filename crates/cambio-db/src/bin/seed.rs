//! # Seed Data Generator
//!
//! Populates the database with a starter currency registry for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p cambio-db --bin seed
//!
//! # Specify database path
//! cargo run -p cambio-db --bin seed -- --db ./data/cambio.db
//!
//! # Pick a different base currency
//! cargo run -p cambio-db --bin seed -- --base EUR
//! ```
//!
//! ## Generated Data
//! - An ISO currency set with per-currency scales (JPY 0, BHD 3, ...)
//! - One base currency (USD unless overridden)
//! - A current-year exchange-rate window for every non-base currency

use std::env;

use cambio_core::{NewCurrency, NewExchangeRate};
use cambio_db::{Database, DbConfig};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Starter registry: code, symbol, name, ISO number, scale, indicative
/// foreign-per-base rate (against USD).
const CURRENCIES: &[(&str, &str, &str, &str, u32, &str)] = &[
    ("USD", "$", "US Dollar", "840", 2, "1"),
    ("EUR", "€", "Euro", "978", 2, "0.92"),
    ("GBP", "£", "Pound Sterling", "826", 2, "0.79"),
    ("CAD", "$", "Canadian Dollar", "124", 2, "1.37"),
    ("AUD", "$", "Australian Dollar", "036", 2, "1.52"),
    ("CHF", "Fr", "Swiss Franc", "756", 2, "0.88"),
    ("JPY", "¥", "Japanese Yen", "392", 0, "151"),
    ("INR", "₹", "Indian Rupee", "356", 2, "83.4"),
    ("BHD", "BD", "Bahraini Dinar", "048", 3, "0.376"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cambio_dev.db");
    let mut base_code = String::from("USD");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--base" | "-b" => {
                if i + 1 < args.len() {
                    base_code = args[i + 1].to_uppercase();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("cambio Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cambio_dev.db)");
                println!("  -b, --base <CODE>  Base currency code (default: USD)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 cambio Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Base:     {}", base_code);
    println!();

    // Connect to database
    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing registry
    let existing = db.currencies().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} currencies", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    if !CURRENCIES.iter().any(|(code, ..)| *code == base_code) {
        println!("✗ Unknown base currency '{}'", base_code);
        return Ok(());
    }

    // Seed the registry
    println!();
    println!("Seeding currencies...");

    let year = Utc::now().year();
    let window_start = NaiveDate::from_ymd_opt(year, 1, 1).expect("valid start of year");
    let window_end = NaiveDate::from_ymd_opt(year, 12, 31).expect("valid end of year");

    let currencies = db.currencies();
    let rates = db.rates();
    let mut seeded_rates = 0;

    for (code, symbol, name, iso_number, scale, rate) in CURRENCIES {
        let is_base = *code == base_code;
        let currency = currencies
            .insert(&NewCurrency {
                code: code.to_string(),
                symbol: symbol.to_string(),
                name: name.to_string(),
                iso_number: Some(iso_number.to_string()),
                scale: *scale,
                is_base,
            })
            .await?;

        if is_base {
            println!("  {} (base, scale {})", currency.label(), scale);
            continue;
        }

        let rate: Decimal = rate.parse()?;
        rates
            .insert(&NewExchangeRate {
                currency_id: currency.id.clone(),
                rate,
                effective: window_start,
                expires: window_end,
            })
            .await?;
        seeded_rates += 1;

        println!("  {} (scale {}, rate {})", currency.label(), scale, rate);
    }

    println!();
    println!(
        "✓ Seeded {} currencies and {} rate windows for {}",
        CURRENCIES.len(),
        seeded_rates,
        year
    );

    Ok(())
}
