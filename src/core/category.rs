//! Expense categories.
//!
//! The set is closed and known at compile time. Labels that do not match a
//! known category (older data, typos from other writers) are read as
//! [`Category::Other`] instead of failing.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Classification attached to every expense.
///
/// The declaration order is the canonical order used for tie-breaking in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    /// Housing costs
    Rent,
    /// Groceries and eating out
    Food,
    /// General purchases
    Shopping,
    /// Leisure spending
    Entertainment,
    /// Anything else, including unrecognised legacy labels
    Other,
}

impl Category {
    /// Every category in canonical order.
    pub const ALL: [Self; 5] = [
        Self::Rent,
        Self::Food,
        Self::Shopping,
        Self::Entertainment,
        Self::Other,
    ];

    /// The label used in storage and display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rent => "Rent",
            Self::Food => "Food",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
            Self::Other => "Other",
        }
    }

    /// Parses a label case-insensitively, ignoring surrounding whitespace.
    /// Unknown labels map to [`Category::Other`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(label))
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}
