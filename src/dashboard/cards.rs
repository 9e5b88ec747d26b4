//! Stat cards summarising a user's spending.

use maud::{Markup, html};

use crate::{
    aggregation::ExpenseSummary,
    html::{CARD_STYLE, format_currency},
};

/// Shown in place of the top category when there are no expenses.
const NO_CATEGORY: &str = "-";

/// Renders the four stat cards at the top of the dashboard.
pub(super) fn summary_cards_view(summary: &ExpenseSummary) -> Markup {
    let top_category = summary
        .top_category
        .map(|category| category.name())
        .unwrap_or(NO_CATEGORY);

    html! {
        section
            id="summary-cards"
            class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 mb-8"
        {
            (stat_card("Total Spend", &format_currency(summary.total_spend)))
            (stat_card("This Month", &format_currency(summary.current_month_spend)))
            (stat_card("Top Category", top_category))
            (stat_card("Categories", &summary.category_count.to_string()))
        }
    }
}

fn stat_card(title: &str, value: &str) -> Markup {
    html! {
        div class={ (CARD_STYLE) " flex flex-col justify-between" } aria-label=(title)
        {
            h4 class="text-sm font-medium text-gray-600 dark:text-gray-400 mb-2" { (title) }
            div class="text-3xl font-bold truncate" title=(value) { (value) }
        }
    }
}

/// Renders the message shown when the user has no expenses.
pub(super) fn empty_state_view() -> Markup {
    html! {
        section id="empty-state" class="w-full mx-auto mb-8" {
            div class={ (CARD_STYLE) " p-8 text-center max-w-md mx-auto" } {
                h3 class="text-xl font-semibold mb-3" {
                    "No expenses yet"
                }
                p class="text-gray-700 dark:text-gray-300" {
                    "Add your first expense below to see where your money goes."
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
        expense::{Amount, Category, Expense},
    };

    use super::{empty_state_view, summary_cards_view};

    fn expense(id: i64, category: Category, cents: i64) -> Expense {
        Expense {
            id,
            owner: crate::auth::UserID::new(1),
            category,
            amount: Amount::new(Decimal::new(cents, 2)).unwrap(),
            date: date!(2025 - 03 - 01),
            description: None,
        }
    }

    fn card_values(html: &Html) -> Vec<(String, String)> {
        let card_selector = Selector::parse("#summary-cards > div").unwrap();
        let title_selector = Selector::parse("h4").unwrap();
        let value_selector = Selector::parse("div").unwrap();

        html.select(&card_selector)
            .map(|card| {
                let title = card.select(&title_selector).next().unwrap().inner_html();
                let value = card.select(&value_selector).next().unwrap().inner_html();
                (title, value)
            })
            .collect()
    }

    #[test]
    fn renders_summary_values() {
        let expenses = [
            expense(1, Category::Food, 1050),
            expense(2, Category::Housing, 120000),
        ];
        let summary = summarize(&expenses, date!(2025 - 03 - 15));

        let html = Html::parse_fragment(&summary_cards_view(&summary).into_string());

        assert_eq!(
            card_values(&html),
            vec![
                ("Total Spend".to_owned(), "$1,210.50".to_owned()),
                ("This Month".to_owned(), "$1,210.50".to_owned()),
                ("Top Category".to_owned(), "Housing".to_owned()),
                ("Categories".to_owned(), "2".to_owned()),
            ]
        );
    }

    #[test]
    fn renders_placeholder_without_expenses() {
        let summary = summarize(&[], date!(2025 - 03 - 15));

        let html = Html::parse_fragment(&summary_cards_view(&summary).into_string());

        assert_eq!(
            card_values(&html),
            vec![
                ("Total Spend".to_owned(), "$0.00".to_owned()),
                ("This Month".to_owned(), "$0.00".to_owned()),
                ("Top Category".to_owned(), "-".to_owned()),
                ("Categories".to_owned(), "0".to_owned()),
            ]
        );
    }

    #[test]
    fn empty_state_has_message() {
        let html = empty_state_view().into_string();

        assert!(html.contains("No expenses yet"));
    }
}
