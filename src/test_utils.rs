//! Shared test utilities.
//!
//! Helpers for setting up an in-memory database and building records with
//! sensible defaults.
#![allow(clippy::unwrap_used)]

use crate::{
    core::{category::Category, expense::ExpenseRecord},
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = crate::config::database::create_connection("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a calendar date, panicking on an impossible one.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Builds an expense record.
pub fn record(amount: Decimal, category: Category, notes: &str) -> ExpenseRecord {
    ExpenseRecord::new(amount, category, notes)
}
