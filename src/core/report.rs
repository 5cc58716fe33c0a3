//! Text rendering for breakdowns and trends.
//!
//! The calculators never round; rounding happens here, at the edge, for
//! humans reading logs or a terminal. Amounts render as `$1,234.56`, changes
//! as `+5.1%`, and metrics that do not apply as `N/A`.

use crate::core::{
    breakdown::CategoryBreakdown,
    trend::{DisplayOrder, MonthlyTrend},
};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

/// Marker shown for metrics that are undefined.
pub const NOT_APPLICABLE: &str = "N/A";

fn fixed(value: Decimal, places: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    rounded.to_string()
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats an amount as dollars with thousands separators, e.g. `$1,234.50`.
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let text = fixed(amount.abs(), 2);
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Formats a percentage share with one decimal place, e.g. `33.3%`.
#[must_use]
pub fn format_percentage(percentage: Decimal) -> String {
    format!("{}%", fixed(percentage, 1))
}

/// Formats a month-over-month change with an explicit sign, or `N/A`.
#[must_use]
pub fn format_change(change: Option<Decimal>) -> String {
    change.map_or_else(
        || NOT_APPLICABLE.to_string(),
        |value| {
            let text = fixed(value, 1);
            if text.starts_with('-') {
                format!("{text}%")
            } else {
                format!("+{text}%")
            }
        },
    )
}

/// Formats an optional amount, or `N/A`.
#[must_use]
pub fn format_optional_currency(amount: Option<Decimal>) -> String {
    amount.map_or_else(|| NOT_APPLICABLE.to_string(), format_currency)
}

/// Renders a breakdown as a short multi-line summary, largest share first.
#[must_use]
pub fn format_breakdown_summary(breakdown: &CategoryBreakdown) -> String {
    let mut summary = format!(
        "Expenses {} to {}: {} across {} categories\n",
        breakdown.start,
        breakdown.end,
        format_currency(breakdown.total),
        breakdown.category_count()
    );

    if breakdown.is_empty() {
        summary.push_str("  No expenses recorded in this range\n");
        return summary;
    }

    for (category, share) in breakdown.ranked() {
        // write! into a String cannot fail
        let _ = writeln!(
            summary,
            "  {category:<13} {:>12} {:>7}",
            format_currency(share.total),
            format_percentage(share.percentage)
        );
    }

    summary
}

/// Renders a monthly trend table followed by the aggregate line.
#[must_use]
pub fn format_trend_summary(trend: &MonthlyTrend, order: DisplayOrder) -> String {
    let Some(aggregate) = &trend.aggregate else {
        return "Monthly trend: no data\n".to_string();
    };

    let mut summary = format!(
        "Monthly trend - {} months | Total {} | Average {} | Highest {} ({})\n",
        aggregate.month_count,
        format_currency(aggregate.sum),
        format_currency(aggregate.mean),
        format_currency(aggregate.max),
        aggregate.max_label
    );

    for entry in trend.in_display_order(order) {
        let _ = writeln!(
            summary,
            "  {} {:<15} {:>12} {:>8} {:>12}",
            entry.key,
            entry.label,
            format_currency(entry.total),
            format_change(entry.mom_change),
            format_optional_currency(entry.rolling_avg3)
        );
    }

    summary
}
