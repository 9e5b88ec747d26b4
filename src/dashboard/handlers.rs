//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    aggregation::{ExpenseSummary, summarize},
    auth::UserID,
    dashboard::{
        cards::{empty_state_view, summary_cards_view},
        charts::{ECHARTS_URL, build_dashboard_charts, charts_script, charts_view},
        tables::{category_table, expense_table},
    },
    db::lock_connection,
    endpoints,
    expense::{Expense, ExpenseFormAction, ExpenseFormDefaults, expense_form, get_expenses},
    html::{CARD_STYLE, HeadElement, base, dollar_input_styles},
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for displaying the dashboard page.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's spending.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let expenses = {
        let connection = lock_connection(&state.db_connection)?;
        get_expenses(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get expenses: {error}"))?
    };

    let summary = summarize(&expenses, today);

    Ok(dashboard_view(&summary, &expenses, today).into_response())
}

fn dashboard_view(summary: &ExpenseSummary, expenses: &[Expense], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let charts = build_dashboard_charts(summary);

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(summary))

            @if expenses.is_empty() {
                (empty_state_view())
            } @else {
                (charts_view(&charts))

                div class="w-full grid grid-cols-1 xl:grid-cols-3 gap-4 mb-8"
                {
                    div class="xl:col-span-1" { (category_table(summary)) }
                    div class="xl:col-span-2" { (expense_table(expenses)) }
                }
            }

            (new_expense_card(today))
        }
    );

    let mut head_elements = vec![dollar_input_styles()];
    if !expenses.is_empty() {
        head_elements.push(HeadElement::ScriptLink(ECHARTS_URL.to_owned()));
        head_elements.push(charts_script(&charts));
    }

    base("Dashboard", &head_elements, &content)
}

fn new_expense_card(today: Date) -> Markup {
    let form = expense_form(
        ExpenseFormAction::Create(endpoints::EXPENSES_FORM),
        &ExpenseFormDefaults {
            category: None,
            amount: None,
            date: today,
            description: None,
        },
    );

    html! {
        section id="new-expense" class={ "w-full max-w-md " (CARD_STYLE) }
        {
            h3 class="text-xl font-semibold mb-4" { "Add Expense" }

            (form)
        }
    }
}
