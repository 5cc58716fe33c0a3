//! Expense entity - One stored expense line-item.
//!
//! Rows are grouped by `expense_date`; a date's rows are only ever written as a
//! whole set. Amounts are kept as integer cents so that `SUM` is exact, and the
//! category is stored as its label so legacy values still load.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Surrogate key, never exposed outside the store
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar date the expense belongs to
    #[sea_orm(indexed)]
    pub expense_date: Date,
    /// Amount in cents, always strictly positive
    pub amount_cents: i64,
    /// Category label (e.g. `"Food"`)
    pub category: String,
    /// Free-form notes, may be empty
    pub notes: String,
}

/// Expenses have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
