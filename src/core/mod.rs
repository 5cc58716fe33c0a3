//! Core business logic - framework-agnostic expense storage and reporting.
//!
//! The breakdown and trend calculators are pure functions of their inputs;
//! the `generate_*` entry points pair them with the record store.

/// Category breakdown over a date range
pub mod breakdown;
/// The closed set of expense categories
pub mod category;
/// Expense records and whole-day replacement writes
pub mod expense;
/// Text rendering helpers for reports
pub mod report;
/// Record store primitives over the expenses table
pub mod store;
/// Monthly totals, month-over-month change and rolling averages
pub mod trend;
