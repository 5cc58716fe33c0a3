//! Record store - `SeaORM` primitives over the `expenses` table.
//!
//! These are the only functions that touch the database. Each is generic over
//! [`ConnectionTrait`] so it can run on a plain connection or inside an open
//! transaction. None of them retry; failures surface as [`Error::Database`]
//! with the driver's error attached.

use crate::{
    core::{
        breakdown::CategoryTotal,
        category::Category,
        expense::{AMOUNT_SCALE, ExpenseRecord},
        trend::{MonthKey, MonthTotal},
    },
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use sea_orm::{FromQueryResult, QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};
use tracing::debug;

const MONTH_KEY_SQL: &str = "strftime('%Y-%m', \"expense_date\")";

#[derive(Debug, FromQueryResult)]
struct CategoryTotalRow {
    category: String,
    total_cents: i64,
}

#[derive(Debug, FromQueryResult)]
struct MonthTotalRow {
    month_key: String,
    total_cents: i64,
}

/// Converts an amount to integer cents, rounding half away from zero.
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    amount
        .round_dp_with_strategy(AMOUNT_SCALE, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or(Error::InvalidAmount { amount })
}

/// Converts integer cents back to a currency amount.
#[must_use]
pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, AMOUNT_SCALE)
}

impl From<expense::Model> for ExpenseRecord {
    fn from(model: expense::Model) -> Self {
        Self {
            amount: from_minor_units(model.amount_cents),
            category: Category::from_label(&model.category),
            notes: model.notes,
        }
    }
}

/// Fetches every stored row for `date` in entry order.
pub async fn fetch_for_date<C>(db: &C, date: NaiveDate) -> Result<Vec<expense::Model>>
where
    C: ConnectionTrait,
{
    Expense::find()
        .filter(expense::Column::ExpenseDate.eq(date))
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes every row for `date`, returning how many were removed.
pub async fn delete_for_date<C>(db: &C, date: NaiveDate) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Expense::delete_many()
        .filter(expense::Column::ExpenseDate.eq(date))
        .exec(db)
        .await?;
    debug!("Deleted {} expenses for {date}", result.rows_affected);
    Ok(result.rows_affected)
}

/// Inserts one expense row for `date`.
pub async fn insert<C>(db: &C, date: NaiveDate, record: &ExpenseRecord) -> Result<expense::Model>
where
    C: ConnectionTrait,
{
    let row = expense::ActiveModel {
        expense_date: Set(date),
        amount_cents: Set(to_minor_units(record.amount)?),
        category: Set(record.category.label().to_string()),
        notes: Set(record.notes.clone()),
        ..Default::default()
    };

    row.insert(db).await.map_err(Into::into)
}

/// Sums amounts per category label for the inclusive range `start..=end`.
///
/// Labels are parsed leniently, so two legacy labels can both come back as
/// [`Category::Other`]; the breakdown calculator merges such duplicates.
pub async fn fetch_category_totals<C>(
    db: &C,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CategoryTotal>>
where
    C: ConnectionTrait,
{
    let rows = Expense::find()
        .select_only()
        .column(expense::Column::Category)
        .column_as(Expr::col(expense::Column::AmountCents).sum(), "total_cents")
        .filter(expense::Column::ExpenseDate.between(start, end))
        .group_by(expense::Column::Category)
        .into_model::<CategoryTotalRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| CategoryTotal {
            category: Category::from_label(&row.category),
            total: from_minor_units(row.total_cents),
        })
        .collect())
}

/// Sums amounts per calendar month, ascending, one row per month that has expenses.
pub async fn fetch_monthly_totals<C>(db: &C) -> Result<Vec<MonthTotal>>
where
    C: ConnectionTrait,
{
    let rows = Expense::find()
        .select_only()
        .column_as(Expr::cust(MONTH_KEY_SQL), "month_key")
        .column_as(Expr::col(expense::Column::AmountCents).sum(), "total_cents")
        .group_by(Expr::cust(MONTH_KEY_SQL))
        .order_by_asc(Expr::cust(MONTH_KEY_SQL))
        .into_model::<MonthTotalRow>()
        .all(db)
        .await?;

    rows.into_iter()
        .map(|row| {
            let key: MonthKey = row.month_key.parse()?;
            Ok(MonthTotal {
                key,
                label: key.label(),
                total: from_minor_units(row.total_cents),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_minor_units_rounds_half_away_from_zero() {
        assert_eq!(to_minor_units(dec!(12.34)).unwrap(), 1234);
        assert_eq!(to_minor_units(dec!(0.005)).unwrap(), 1);
        assert_eq!(to_minor_units(dec!(7)).unwrap(), 700);
    }

    #[test]
    fn test_to_minor_units_rejects_overflow() {
        let result = to_minor_units(Decimal::MAX);
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(from_minor_units(1234), dec!(12.34));
        assert_eq!(from_minor_units(0), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_insert_and_fetch_for_date_keeps_entry_order() -> Result<()> {
        let db = setup_test_db().await?;
        let day = date(2024, 8, 1);

        insert(&db, day, &record(dec!(20), Category::Food, "lunch")).await?;
        insert(&db, day, &record(dec!(5.5), Category::Other, "")).await?;
        insert(&db, date(2024, 8, 2), &record(dec!(99), Category::Rent, "")).await?;

        let rows = fetch_for_date(&db, day).await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount_cents, 2000);
        assert_eq!(rows[0].notes, "lunch");
        assert_eq!(rows[1].amount_cents, 550);
        assert_eq!(rows[1].category, "Other");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_for_date_only_touches_that_date() -> Result<()> {
        let db = setup_test_db().await?;
        insert(&db, date(2024, 8, 1), &record(dec!(1), Category::Food, "")).await?;
        insert(&db, date(2024, 8, 1), &record(dec!(2), Category::Food, "")).await?;
        insert(&db, date(2024, 8, 2), &record(dec!(3), Category::Food, "")).await?;

        let removed = delete_for_date(&db, date(2024, 8, 1)).await?;
        assert_eq!(removed, 2);
        assert!(fetch_for_date(&db, date(2024, 8, 1)).await?.is_empty());
        assert_eq!(fetch_for_date(&db, date(2024, 8, 2)).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_legacy_category_label_reads_as_other() -> Result<()> {
        let db = setup_test_db().await?;
        let legacy = expense::ActiveModel {
            expense_date: Set(date(2024, 8, 1)),
            amount_cents: Set(1500),
            category: Set("Groceries".to_string()),
            notes: Set(String::new()),
            ..Default::default()
        };
        let model = legacy.insert(&db).await?;

        let record = ExpenseRecord::from(model);
        assert_eq!(record.category, Category::Other);
        assert_eq!(record.amount, dec!(15));

        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_category_totals_is_inclusive() -> Result<()> {
        let db = setup_test_db().await?;
        insert(&db, date(2024, 7, 31), &record(dec!(1000), Category::Rent, "")).await?;
        insert(&db, date(2024, 8, 1), &record(dec!(10), Category::Food, "")).await?;
        insert(&db, date(2024, 8, 3), &record(dec!(2.25), Category::Food, "")).await?;
        insert(&db, date(2024, 8, 5), &record(dec!(40), Category::Shopping, "")).await?;
        insert(&db, date(2024, 8, 6), &record(dec!(500), Category::Shopping, "")).await?;

        let mut totals = fetch_category_totals(&db, date(2024, 8, 1), date(2024, 8, 5)).await?;
        totals.sort_by_key(|t| t.category);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, Category::Food);
        assert_eq!(totals[0].total, dec!(12.25));
        assert_eq!(totals[1].category, Category::Shopping);
        assert_eq!(totals[1].total, dec!(40));

        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_category_totals_empty_range() -> Result<()> {
        let db = setup_test_db().await?;
        let totals = fetch_category_totals(&db, date(2024, 8, 1), date(2024, 8, 5)).await?;
        assert!(totals.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_monthly_totals_ascending() -> Result<()> {
        let db = setup_test_db().await?;
        insert(&db, date(2024, 3, 9), &record(dec!(30), Category::Food, "")).await?;
        insert(&db, date(2023, 12, 31), &record(dec!(5), Category::Food, "")).await?;
        insert(&db, date(2024, 3, 1), &record(dec!(12.5), Category::Rent, "")).await?;
        insert(&db, date(2024, 1, 15), &record(dec!(7), Category::Other, "")).await?;

        let months = fetch_monthly_totals(&db).await?;
        let keys: Vec<String> = months.iter().map(|m| m.key.to_string()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-01", "2024-03"]);
        assert_eq!(months[2].total, dec!(42.5));
        assert_eq!(months[2].label, "March 2024");

        Ok(())
    }
}
