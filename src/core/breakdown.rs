//! Category breakdown over a date range.
//!
//! The calculator turns per-category totals into percentage shares of the
//! grand total. Arithmetic is exact decimal throughout, and the rule for
//! distributing the last fraction of a percent is fixed so results are
//! reproducible and always sum to exactly 100:
//!
//! 1. Totals for the same category are merged.
//! 2. Each share is `total * 100 / grand_total`, kept to [`PERCENT_SCALE`]
//!    decimal places (banker's rounding).
//! 3. The category with the largest total absorbs the residual, so its share
//!    is `100 - sum(other shares)`. Ties go to the earlier category in
//!    canonical order.
//!
//! When the grand total is zero every share is zero.

use crate::{
    core::{category::Category, store},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Decimal places carried by percentage shares.
pub const PERCENT_SCALE: u32 = 20;

/// Aggregated spend for one category, as supplied by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    /// The category
    pub category: Category,
    /// Sum of amounts in the range, never negative
    pub total: Decimal,
}

/// One category's slice of a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    /// Amount spent in the category
    pub total: Decimal,
    /// Share of the grand total, 0 to 100
    pub percentage: Decimal,
}

/// Category breakdown for an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    /// Inclusive start of the range
    pub start: NaiveDate,
    /// Inclusive end of the range
    pub end: NaiveDate,
    /// Shares keyed by category, in canonical order
    pub breakdown: BTreeMap<Category, CategoryShare>,
    /// Grand total across all categories
    pub total: Decimal,
}

impl CategoryBreakdown {
    /// Whether the range had no expenses at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breakdown.is_empty()
    }

    /// Number of categories present in the range.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.breakdown.len()
    }

    /// Categories by share, largest first. Equal shares keep canonical order.
    #[must_use]
    pub fn ranked(&self) -> Vec<(Category, CategoryShare)> {
        let mut ranked: Vec<(Category, CategoryShare)> =
            self.breakdown.iter().map(|(c, s)| (*c, *s)).collect();
        ranked.sort_by(|(a_cat, a), (b_cat, b)| {
            b.percentage
                .cmp(&a.percentage)
                .then_with(|| a_cat.cmp(b_cat))
        });
        ranked
    }

    /// The category with the largest share, if any.
    #[must_use]
    pub fn highest(&self) -> Option<(Category, CategoryShare)> {
        self.ranked().into_iter().next()
    }
}

/// Fails with [`Error::InvalidRange`] when `start` is after `end`.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(Error::InvalidRange { start, end });
    }
    Ok(())
}

/// Computes the category breakdown for `start..=end` from pre-aggregated totals.
///
/// Empty input is a valid report with a zero total. Input order does not
/// affect the result.
///
/// # Arguments
/// * `start` - Inclusive start of the range
/// * `end` - Inclusive end of the range
/// * `totals` - Per-category totals; repeated categories are merged
///
/// # Returns
/// * `Ok(CategoryBreakdown)` - Shares that sum to exactly 100, or all zero
///   when the grand total is zero
/// * `Err(Error::InvalidRange)` - `start` is after `end`
/// * `Err(Error::InvalidAmount)` - A total is negative, or the totals are too
///   large to sum
pub fn compute_breakdown(
    start: NaiveDate,
    end: NaiveDate,
    totals: &[CategoryTotal],
) -> Result<CategoryBreakdown> {
    validate_range(start, end)?;

    let mut merged: BTreeMap<Category, Decimal> = BTreeMap::new();
    for entry in totals {
        if entry.total < Decimal::ZERO {
            return Err(Error::InvalidAmount {
                amount: entry.total,
            });
        }
        let merged_total = merged.entry(entry.category).or_insert(Decimal::ZERO);
        *merged_total = merged_total
            .checked_add(entry.total)
            .ok_or(Error::InvalidAmount {
                amount: entry.total,
            })?;
    }

    let total = merged
        .values()
        .try_fold(Decimal::ZERO, |sum, amount| {
            sum.checked_add(*amount)
                .ok_or(Error::InvalidAmount { amount: *amount })
        })?;
    let breakdown = if total.is_zero() {
        merged
            .into_iter()
            .map(|(category, amount)| {
                (
                    category,
                    CategoryShare {
                        total: amount,
                        percentage: Decimal::ZERO,
                    },
                )
            })
            .collect()
    } else {
        apportion(&merged, total)
    };

    Ok(CategoryBreakdown {
        start,
        end,
        breakdown,
        total,
    })
}

fn apportion(
    merged: &BTreeMap<Category, Decimal>,
    total: Decimal,
) -> BTreeMap<Category, CategoryShare> {
    // BTreeMap iterates in canonical order, so `>` keeps the earliest on ties
    let anchor = merged
        .iter()
        .fold(None::<(Category, Decimal)>, |best, (category, amount)| match best {
            Some((_, best_amount)) if *amount <= best_amount => best,
            _ => Some((*category, *amount)),
        })
        .map(|(category, _)| category);

    let mut shares = BTreeMap::new();
    let mut assigned = Decimal::ZERO;
    for (category, amount) in merged {
        if Some(*category) == anchor {
            continue;
        }
        let percentage = share_of(*amount, total);
        assigned += percentage;
        shares.insert(
            *category,
            CategoryShare {
                total: *amount,
                percentage,
            },
        );
    }

    if let Some(category) = anchor {
        shares.insert(
            category,
            CategoryShare {
                total: merged[&category],
                percentage: Decimal::ONE_HUNDRED - assigned,
            },
        );
    }

    shares
}

/// `amount * 100 / total`, rounded to [`PERCENT_SCALE`] places.
///
/// `amount <= total` here, so dividing first cannot overflow when the
/// multiplication would.
fn share_of(amount: Decimal, total: Decimal) -> Decimal {
    let share = match amount.checked_mul(Decimal::ONE_HUNDRED) {
        Some(scaled) => scaled / total,
        None => amount / total * Decimal::ONE_HUNDRED,
    };
    share.round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Fetches category totals for `start..=end` from the store and computes the breakdown.
///
/// The range is validated before the store is queried.
pub async fn generate_breakdown(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<CategoryBreakdown> {
    validate_range(start, end)?;

    let totals = store::fetch_category_totals(db, start, end).await?;
    debug!(
        "Fetched {} category totals for {start}..={end}",
        totals.len()
    );

    compute_breakdown(start, end, &totals)
}
