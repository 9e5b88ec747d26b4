//! Reduces a user's expenses into the summary statistics shown on the
//! dashboard and returned by the summary API.
//!
//! Everything here is pure: no I/O and no hidden state, so summarising the
//! same expenses on the same day always gives the same result. Amounts are
//! accumulated as exact decimals and only rounded when formatted for display.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer, ser::SerializeStruct};
use time::{Date, Duration, Month};

use crate::expense::{Amount, Category, Expense};

/// The number of calendar months in [ExpenseSummary::monthly_series].
pub const MONTHS_IN_SERIES: usize = 12;

/// Summary statistics for a collection of expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseSummary {
    /// The sum of every expense.
    pub total_spend: Amount,
    /// The sum of the expenses dated in the same calendar month as the reference date.
    pub current_month_spend: Amount,
    /// The total spend per category, only for categories that have expenses.
    pub by_category: BTreeMap<Category, Amount>,
    /// The category with the largest total, ties going to the alphabetically first name.
    pub top_category: Option<Category>,
    /// The number of distinct categories with expenses.
    pub category_count: usize,
    /// The total spend for each of the twelve months ending with the reference date's month, oldest first.
    pub monthly_series: Vec<MonthlyTotal>,
    /// The number of expenses.
    pub expense_count: usize,
}

/// The total spend for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotal {
    /// The first day of the month.
    pub month: Date,
    pub total: Amount,
}

impl MonthlyTotal {
    /// A short label for charts, e.g. "Jan 2025".
    pub fn label(&self) -> String {
        format!("{} {}", month_abbreviation(self.month.month()), self.month.year())
    }
}

impl Serialize for MonthlyTotal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("MonthlyTotal", 3)?;
        state.serialize_field(
            "month",
            &format!("{:04}-{:02}", self.month.year(), self.month.month() as u8),
        )?;
        state.serialize_field("label", &self.label())?;
        state.serialize_field("total", &self.total)?;
        state.end()
    }
}

/// Summarise `expenses` relative to the reference date `today`.
///
/// `today` decides which month counts as the current month and where the
/// monthly series ends. Expenses outside the monthly series still count
/// towards every other statistic.
pub fn summarize(expenses: &[Expense], today: Date) -> ExpenseSummary {
    let current_month = first_of_month(today);
    let mut monthly_series = month_window(current_month);

    let mut total_spend = Amount::ZERO;
    let mut current_month_spend = Amount::ZERO;
    let mut by_category = BTreeMap::new();

    for expense in expenses {
        let month = first_of_month(expense.date);

        total_spend = total_spend + expense.amount;

        if month == current_month {
            current_month_spend = current_month_spend + expense.amount;
        }

        let category_total = by_category.entry(expense.category).or_insert(Amount::ZERO);
        *category_total = *category_total + expense.amount;

        if let Ok(index) = monthly_series.binary_search_by_key(&month, |entry| entry.month) {
            monthly_series[index].total = monthly_series[index].total + expense.amount;
        }
    }

    ExpenseSummary {
        total_spend,
        current_month_spend,
        top_category: top_category(&by_category),
        category_count: by_category.len(),
        by_category,
        monthly_series,
        expense_count: expenses.len(),
    }
}

fn top_category(by_category: &BTreeMap<Category, Amount>) -> Option<Category> {
    by_category
        .iter()
        .max_by(|(left_category, left_total), (right_category, right_total)| {
            left_total
                .cmp(right_total)
                // Reversed so the alphabetically first name is the larger element.
                .then_with(|| right_category.name().cmp(left_category.name()))
        })
        .map(|(category, _)| *category)
}

/// The twelve months ending with `current_month`, oldest first, with zero totals.
///
/// The window is cut short if it would start before [Date::MIN].
fn month_window(current_month: Date) -> Vec<MonthlyTotal> {
    let mut months = Vec::with_capacity(MONTHS_IN_SERIES);
    let mut month = current_month;

    for _ in 0..MONTHS_IN_SERIES {
        months.push(MonthlyTotal {
            month,
            total: Amount::ZERO,
        });
        let Some(last_day_of_previous_month) = month.previous_day() else {
            break;
        };
        month = first_of_month(last_day_of_previous_month);
    }

    months.reverse();
    months
}

fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
