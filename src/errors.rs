//! Unified error types for the expense ledger.
//!
//! Every fallible operation in the crate returns [`Result`]. Empty reports are
//! not errors: a valid query over a range with no expenses yields a zero-valued
//! result instead.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by the aggregation engine and its record store.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested report window starts after it ends.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange {
        /// Inclusive start of the requested window
        start: NaiveDate,
        /// Inclusive end of the requested window
        end: NaiveDate,
    },

    /// An amount that cannot be stored or aggregated.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: Decimal,
    },

    /// A month key that is not of the form `YYYY-MM`.
    #[error("Invalid month key: {value}")]
    InvalidMonthKey {
        /// The text that failed to parse
        value: String,
    },

    /// Any failure reported by the record store. The underlying cause is kept.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration file or environment problems.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Filesystem failures while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
