//! Expense records and whole-day replacement.
//!
//! A calendar date owns either no records or a non-empty list of them. Writes
//! never merge: [`replace_day`] swaps the complete set for a date inside one
//! database transaction, so a failed write leaves the previous set in place.
//! Amounts that are zero or negative after rounding to cents are dropped
//! before anything is written.

use crate::{
    core::{category::Category, store},
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Decimal places kept for stored amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// One expense line-item. Records carry no identity of their own; they only
/// exist as part of a date's set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Amount in currency units
    pub amount: Decimal,
    /// What the money was spent on
    pub category: Category,
    /// Free-form notes, may be empty
    #[serde(default)]
    pub notes: String,
}

impl ExpenseRecord {
    /// Builds a record.
    pub fn new(amount: Decimal, category: Category, notes: impl Into<String>) -> Self {
        Self {
            amount,
            category,
            notes: notes.into(),
        }
    }

    /// Rounds the amount to storage precision, half away from zero.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.amount = self
            .amount
            .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
        self
    }

    /// Whether the record would be kept by a replacement write.
    #[must_use]
    pub fn is_storable(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Result of a successful [`replace_day`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaceOutcome {
    /// Records now stored for the date
    pub stored: usize,
    /// Candidates dropped for having a non-positive amount
    pub dropped: usize,
    /// Records that were stored for the date before the write
    pub replaced: u64,
}

/// Normalises every candidate and keeps the ones with a positive amount.
///
/// Returns the kept records in their original order together with the number
/// dropped.
#[must_use]
pub fn retain_storable(candidates: Vec<ExpenseRecord>) -> (Vec<ExpenseRecord>, usize) {
    let total = candidates.len();
    let kept: Vec<ExpenseRecord> = candidates
        .into_iter()
        .map(ExpenseRecord::normalized)
        .filter(|record| {
            let keep = record.is_storable();
            if !keep {
                debug!(
                    "Dropping {} expense with non-positive amount {}",
                    record.category, record.amount
                );
            }
            keep
        })
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Replaces every stored record for `date` with the storable `candidates`.
///
/// The delete and all inserts share one database transaction. If any step
/// fails the transaction is rolled back and the error is returned, leaving the
/// date exactly as it was. An empty (or fully filtered) candidate list clears
/// the date. Repeating the same call produces the same stored set.
///
/// # Arguments
/// * `db` - Database connection
/// * `date` - The date whose records are replaced
/// * `candidates` - Proposed records; those without a positive amount are dropped
///
/// # Returns
/// * `Ok(ReplaceOutcome)` - Counts of stored, dropped and previously stored records
/// * `Err(Error::InvalidAmount)` - An amount too large to store; nothing changes
/// * `Err(Error::Database)` - The store failed; nothing changes
pub async fn replace_day(
    db: &DatabaseConnection,
    date: NaiveDate,
    candidates: Vec<ExpenseRecord>,
) -> Result<ReplaceOutcome> {
    let (records, dropped) = retain_storable(candidates);

    let txn = db.begin().await?;
    let replaced = store::delete_for_date(&txn, date).await?;
    for record in &records {
        store::insert(&txn, date, record).await?;
    }
    txn.commit().await?;

    info!(
        "Replaced expenses for {date}: {} stored, {dropped} dropped, {replaced} previous",
        records.len()
    );

    Ok(ReplaceOutcome {
        stored: records.len(),
        dropped,
        replaced,
    })
}

/// Retrieves the records stored for `date` in entry order.
///
/// Returns `None` when nothing is stored for the date.
pub async fn get_expenses_for_date(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> Result<Option<Vec<ExpenseRecord>>> {
    let rows = store::fetch_for_date(db, date).await?;
    if rows.is_empty() {
        return Ok(None);
    }

    Ok(Some(rows.into_iter().map(ExpenseRecord::from).collect()))
}
