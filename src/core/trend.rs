//! Monthly totals and the trend metrics derived from them.
//!
//! Month-over-month change and the three-month trailing average depend on the
//! order of the months, so they are always computed oldest-to-newest. Display
//! order is applied afterwards with [`MonthlyTrend::in_display_order`].

use crate::{
    core::store,
    errors::{Error, Result},
};
use chrono::{Datelike, Month, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::debug;

/// Number of months in the trailing average window.
pub const ROLLING_WINDOW: usize = 3;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Builds a key, returning `None` unless `month` is 1 to 12.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month number, 1 to 12
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Display label such as `"August 2024"`.
    #[must_use]
    pub fn label(self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or("Unknown", |m| m.name());
        format!("{name} {}", self.year)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMonthKey {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

/// Order in which trend rows are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOrder {
    /// Oldest month first
    Chronological,
    /// Newest month first
    #[default]
    NewestFirst,
}

/// Total spend for one month, as supplied by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotal {
    /// The month
    pub key: MonthKey,
    /// Display label for the month
    pub label: String,
    /// Sum of all expenses in the month
    pub total: Decimal,
}

/// One month with its derived trend metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrendEntry {
    /// The month
    pub key: MonthKey,
    /// Display label for the month
    pub label: String,
    /// Sum of all expenses in the month
    pub total: Decimal,
    /// Percent change from the previous month; `None` for the first month or
    /// when the previous total is zero
    pub mom_change: Option<Decimal>,
    /// Mean of this month and the two before it; `None` for the first two months
    pub rolling_avg3: Option<Decimal>,
}

/// Aggregates over every month in a trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendAggregate {
    /// Sum of the monthly totals
    pub sum: Decimal,
    /// Mean of the monthly totals
    pub mean: Decimal,
    /// Largest monthly total
    pub max: Decimal,
    /// Month that owns `max`; the earliest such month on ties
    pub max_month: MonthKey,
    /// Display label of `max_month`
    pub max_label: String,
    /// Number of months aggregated
    pub month_count: usize,
}

/// Monthly trend report. `aggregate` is `None` when there is no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    /// Entries oldest first
    pub entries: Vec<MonthlyTrendEntry>,
    /// Whole-sequence aggregates, absent when there are no months
    pub aggregate: Option<TrendAggregate>,
}

impl MonthlyTrend {
    /// Whether there were no months with expenses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the requested presentation order. Metrics are unaffected.
    #[must_use]
    pub fn in_display_order(&self, order: DisplayOrder) -> Vec<&MonthlyTrendEntry> {
        match order {
            DisplayOrder::Chronological => self.entries.iter().collect(),
            DisplayOrder::NewestFirst => self.entries.iter().rev().collect(),
        }
    }
}

/// Percent change from `previous` to `current`.
///
/// Returns `None` when `previous` is zero, or when the change is too large to
/// represent; both cases are reported as not applicable.
#[must_use]
pub fn percent_change(previous: Decimal, current: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    current
        .checked_sub(previous)?
        .checked_div(previous)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

fn checked_sum(totals: &[Decimal]) -> Result<Decimal> {
    totals.iter().try_fold(Decimal::ZERO, |acc, total| {
        acc.checked_add(*total)
            .ok_or(Error::InvalidAmount { amount: *total })
    })
}

fn checked_mean(totals: &[Decimal]) -> Result<Decimal> {
    let sum = checked_sum(totals)?;
    if totals.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Ok(sum / Decimal::from(totals.len()))
}

/// Computes per-month trend metrics and whole-sequence aggregates.
///
/// Input is sorted by month before anything is computed, so the metrics are
/// correct even if the caller passes months out of order. Months absent from
/// the input are not zero-filled: each entry is compared with the entry before
/// it, whatever calendar month that is.
///
/// # Arguments
/// * `months` - Monthly totals, one per month that has expenses
///
/// # Returns
/// A `MonthlyTrend` with entries oldest first. `aggregate` is `None` when
/// `months` is empty. Fails with `Error::InvalidAmount` when a sum of totals
/// does not fit in a `Decimal`.
pub fn compute_monthly_trend(months: &[MonthTotal]) -> Result<MonthlyTrend> {
    let mut ordered = months.to_vec();
    ordered.sort_by_key(|m| m.key);
    let totals: Vec<Decimal> = ordered.iter().map(|m| m.total).collect();

    let mut entries = Vec::with_capacity(ordered.len());
    for (i, month) in ordered.iter().enumerate() {
        let mom_change = i
            .checked_sub(1)
            .and_then(|prev| percent_change(totals[prev], month.total));
        let rolling_avg3 = match (i + 1).checked_sub(ROLLING_WINDOW) {
            Some(start) => Some(checked_mean(&totals[start..=i])?),
            None => None,
        };

        entries.push(MonthlyTrendEntry {
            key: month.key,
            label: month.label.clone(),
            total: month.total,
            mom_change,
            rolling_avg3,
        });
    }

    let aggregate = aggregate(&entries, &totals)?;
    Ok(MonthlyTrend { entries, aggregate })
}

fn aggregate(entries: &[MonthlyTrendEntry], totals: &[Decimal]) -> Result<Option<TrendAggregate>> {
    let Some(first) = entries.first() else {
        return Ok(None);
    };
    let peak = entries
        .iter()
        .skip(1)
        .fold(first, |best, entry| if entry.total > best.total { entry } else { best });

    Ok(Some(TrendAggregate {
        sum: checked_sum(totals)?,
        mean: checked_mean(totals)?,
        max: peak.total,
        max_month: peak.key,
        max_label: peak.label.clone(),
        month_count: entries.len(),
    }))
}

/// Fetches monthly totals from the store and computes the trend.
///
/// # Arguments
/// * `db` - Database connection
///
/// # Returns
/// The trend over every month with at least one expense
pub async fn generate_monthly_trend(db: &DatabaseConnection) -> Result<MonthlyTrend> {
    let months = store::fetch_monthly_totals(db).await?;
    debug!("Fetched {} monthly totals", months.len());
    compute_monthly_trend(&months)
}
