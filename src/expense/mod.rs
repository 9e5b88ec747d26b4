//! Expenses: the data model, database queries, JSON API and HTML form handlers.

mod amount;
mod api;
mod category;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use amount::Amount;
pub use api::{
    create_expense_api, delete_expense_api, get_expense_api, get_expense_summary_api,
    list_expenses_api, update_expense_api,
};
pub use category::Category;
pub use core::{
    Expense, NewExpense, create_expense, create_expense_table, delete_expense, get_expense,
    get_expenses, update_expense,
};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::{get_edit_expense_page, update_expense_endpoint};
pub use form::{ExpenseFormAction, ExpenseFormDefaults, expense_form, parse_date};

/// The state needed to read and write expenses.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
