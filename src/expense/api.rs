//! JSON endpoints for managing expenses and reading the expense summary.

use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    Error,
    aggregation::{ExpenseSummary, summarize},
    api::{ApiError, ApiJson, ApiPath, Message},
    auth::UserID,
    database_id::ExpenseId,
    db::lock_connection,
    expense::{
        Expense, ExpenseState, NewExpense, create_expense, delete_expense, form::ExpenseForm,
        get_expense, get_expenses, parse_date, update_expense,
    },
    timezone::local_today,
};

/// List the caller's expenses, newest first.
pub async fn list_expenses_api(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
) -> Result<ApiJson<Vec<Expense>>, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    let expenses = get_expenses(user_id, &connection)?;

    Ok(ApiJson(expenses))
}

/// Record a new expense for the caller.
///
/// Responds with 201 and the stored expense, or 400 if a field is invalid.
pub async fn create_expense_api(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<ExpenseForm>,
) -> Result<(StatusCode, ApiJson<Expense>), ApiError> {
    let new_expense = NewExpense::try_from(form)?;

    let connection = lock_connection(&state.db_connection)?;
    let expense = create_expense(user_id, &new_expense, &connection)?;
    tracing::debug!("User {user_id} created expense {}", expense.id);

    Ok((StatusCode::CREATED, ApiJson(expense)))
}

/// Get one of the caller's expenses.
pub async fn get_expense_api(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    ApiPath(expense_id): ApiPath<ExpenseId>,
) -> Result<ApiJson<Expense>, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    let expense = get_expense(expense_id, user_id, &connection)?;

    Ok(ApiJson(expense))
}

/// Replace the fields of one of the caller's expenses.
pub async fn update_expense_api(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    ApiPath(expense_id): ApiPath<ExpenseId>,
    ApiJson(form): ApiJson<ExpenseForm>,
) -> Result<ApiJson<Expense>, ApiError> {
    let changes = NewExpense::try_from(form)?;

    let connection = lock_connection(&state.db_connection)?;
    let expense = update_expense(expense_id, user_id, &changes, &connection)?;

    Ok(ApiJson(expense))
}

/// Delete one of the caller's expenses.
pub async fn delete_expense_api(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    ApiPath(expense_id): ApiPath<ExpenseId>,
) -> Result<ApiJson<Message>, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    delete_expense(expense_id, user_id, &connection)?;
    tracing::debug!("User {user_id} deleted expense {expense_id}");

    Ok(ApiJson(Message {
        message: "Expense deleted",
    }))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// The reference date in the format `YYYY-MM-DD`. Defaults to today in
    /// the server's local timezone.
    today: Option<String>,
}

/// Summarise all of the caller's expenses.
pub async fn get_expense_summary_api(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<SummaryQuery>,
) -> Result<ApiJson<ExpenseSummary>, ApiError> {
    let today = match query.today.as_deref() {
        Some(text) => parse_date(text)?,
        None => local_today(&state.local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?,
    };

    let expenses = {
        let connection = lock_connection(&state.db_connection)?;
        get_expenses(user_id, &connection)?
    };

    Ok(ApiJson(summarize(&expenses, today)))
}
