//! # Repository Module
//!
//! Repository implementations for database operations.
//!
//! ## Repository Pattern
//! Each repository owns the SQL for one table family and hands out core
//! domain types; callers never see rows or column names.
//!
//! - [`currency`] - The currency registry table and the mandated-scale query
//! - [`rate`] - Exchange-rate windows and conversions
//! - [`settings`] - The key/value metrics store

pub mod currency;
pub mod rate;
pub mod settings;
