//! Table views for the dashboard.
//!
//! Provides the spend-by-category breakdown and the list of expenses with
//! their edit and delete controls.

use maud::{Markup, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    aggregation::ExpenseSummary,
    endpoints::{self, format_endpoint},
    expense::{Amount, Category, Expense},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency,
    },
};

const TABLE_STYLE: &str = "w-full text-sm text-left text-gray-500 dark:text-gray-400";

/// The share of `total` that `amount` makes up, as a percentage.
fn percentage_of(amount: Amount, total: Amount) -> f64 {
    if total.as_decimal().is_zero() {
        return 0.0;
    }

    (amount.as_decimal() / total.as_decimal() * Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or_default()
}

/// Renders the total spend and share of spend for each category with expenses.
pub(super) fn category_table(summary: &ExpenseSummary) -> Markup {
    html! {
        div id="category-breakdown" {
            h3 class="text-xl font-semibold mb-4" { "Spending by Category" }

            div class="overflow-x-auto rounded-lg shadow" {
                table class=(TABLE_STYLE) {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                        }
                    }
                    tbody {
                        @for (category, total) in &summary.by_category {
                            @let percentage = percentage_of(*total, summary.total_spend);

                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class={ (TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white" } {
                                    (category_badge(*category))
                                }
                                td class=(TABLE_CELL_STYLE) { (format_currency(*total)) }
                                td class=(TABLE_CELL_STYLE) {
                                    div class="text-sm mb-1" { (format!("{percentage:.0}%")) }
                                    (progress_bar(percentage, category.colour()))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders a horizontal progress bar showing a percentage of total spend.
fn progress_bar(percentage: f64, colour: &str) -> Markup {
    let clamped = percentage.clamp(0.0, 100.0);

    // Ensure minimum 3% width so rounded corners are visible
    let display_percentage = if clamped > 0.0 && clamped < 3.0 {
        3.0
    } else {
        clamped
    };

    html! {
        div
            class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5"
            role="progressbar"
            aria-valuenow=(format!("{clamped:.0}"))
            aria-valuemin="0"
            aria-valuemax="100"
        {
            @if clamped > 0.0 {
                div
                    class="h-2.5 rounded-full"
                    style=(format!("width: {display_percentage:.1}%; background-color: {colour}"))
                {}
            }
        }
    }
}

fn category_badge(category: Category) -> Markup {
    html! {
        span class="inline-flex items-center gap-2" {
            span
                class="inline-block w-3 h-3 rounded-full"
                style=(format!("background-color: {}", category.colour()))
            {}
            (category.name())
        }
    }
}

/// Renders the user's expenses, in the order given, with edit and delete controls.
pub(super) fn expense_table(expenses: &[Expense]) -> Markup {
    html! {
        div id="expenses" {
            h3 class="text-xl font-semibold mb-4" { "Expenses" }

            div class="overflow-x-auto rounded-lg shadow" {
                table class=(TABLE_STYLE) {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                        }
                    }
                    tbody {
                        @for expense in expenses {
                            (expense_row(expense))
                        }
                    }
                }
            }
        }
    }
}

fn expense_row(expense: &Expense) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id);
    let delete_url = format_endpoint(endpoints::EXPENSE_FORM, expense.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id) {
            td class={ (TABLE_CELL_STYLE) " whitespace-nowrap" } { (expense.date) }
            td class=(TABLE_CELL_STYLE) { (category_badge(expense.category)) }
            td class=(TABLE_CELL_STYLE) { (expense.description.as_deref().unwrap_or_default()) }
            td class={ (TABLE_CELL_STYLE) " text-right whitespace-nowrap" } {
                (format_currency(expense.amount))
            }
            td class={ (TABLE_CELL_STYLE) " flex gap-4 justify-end" } {
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                button
                    type="button"
                    hx-delete=(delete_url)
                    hx-confirm="Are you sure you want to delete this expense?"
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        aggregation::summarize,
        auth::UserID,
        endpoints::{self, format_endpoint},
        expense::{Amount, Category, Expense},
    };

    use super::{category_table, expense_table, percentage_of, progress_bar};

    fn expense(id: i64, category: Category, cents: i64, description: Option<&str>) -> Expense {
        Expense {
            id,
            owner: UserID::new(1),
            category,
            amount: Amount::new(Decimal::new(cents, 2)).unwrap(),
            date: date!(2025 - 03 - 01),
            description: description.map(str::to_owned),
        }
    }

    fn amount(cents: i64) -> Amount {
        Amount::new(Decimal::new(cents, 2)).unwrap()
    }

    #[test]
    fn percentage_of_zero_total_is_zero() {
        assert_eq!(percentage_of(Amount::ZERO, Amount::ZERO), 0.0);
        assert_eq!(percentage_of(amount(2500), amount(10000)), 25.0);
    }

    #[test]
    fn category_rows_follow_category_order() {
        let expenses = [
            expense(1, Category::Other, 100, None),
            expense(2, Category::Food, 300, None),
        ];
        let summary = summarize(&expenses, date!(2025 - 03 - 15));

        let html = Html::parse_fragment(&category_table(&summary).into_string());

        let row_selector = Selector::parse("tbody tr").unwrap();
        let rows: Vec<String> = html
            .select(&row_selector)
            .map(|row| row.text().collect::<String>())
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("Food") && rows[0].contains("$3.00") && rows[0].contains("75%"));
        assert!(rows[1].contains("Other") && rows[1].contains("$1.00") && rows[1].contains("25%"));
    }

    #[test]
    fn expense_rows_have_edit_and_delete_controls() {
        let expenses = [expense(7, Category::Food, 1250, Some("Lunch"))];

        let html = Html::parse_fragment(&expense_table(&expenses).into_string());

        let link_selector = Selector::parse("a").unwrap();
        let link = html.select(&link_selector).next().expect("no edit link");
        assert_eq!(
            link.value().attr("href"),
            Some(format_endpoint(endpoints::EDIT_EXPENSE_VIEW, 7).as_str())
        );

        let button_selector = Selector::parse("button[hx-delete]").unwrap();
        let button = html.select(&button_selector).next().expect("no delete button");
        assert_eq!(button.value().attr("hx-delete"), Some("/expenses/7"));

        let text: String = html.root_element().text().collect();
        assert!(text.contains("2025-03-01"));
        assert!(text.contains("Lunch"));
        assert!(text.contains("$12.50"));
    }

    #[test]
    fn progress_bar_has_minimum_width_for_small_percentages() {
        let html = progress_bar(0.5, "#000000").into_string();

        assert!(html.contains("width: 3.0%"));
    }

    #[test]
    fn progress_bar_clamps_out_of_range_values() {
        let empty = progress_bar(-5.0, "#000000").into_string();
        let full = progress_bar(150.0, "#000000").into_string();

        assert!(empty.contains("aria-valuenow=\"0\""));
        assert!(!empty.contains("width:"));
        assert!(full.contains("width: 100.0%"));
    }
}
