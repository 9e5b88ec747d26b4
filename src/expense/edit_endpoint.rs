//! The page and endpoint for editing an existing expense.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::html;

use crate::{
    Error,
    auth::UserID,
    database_id::ExpenseId,
    endpoints::{self, format_endpoint},
    expense::{
        ExpenseFormAction, ExpenseFormDefaults, ExpenseState, NewExpense, expense_form,
        form::ExpenseForm, get_expense, update_expense,
    },
    html::{BUTTON_DELETE_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// Renders the page for editing an expense.
///
/// Expenses that belong to other users are reported as not found.
pub async fn get_edit_expense_page(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let expense = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        match get_expense(expense_id, user_id, &connection) {
            Ok(expense) => expense,
            Err(Error::NotFound) => return Error::NotFound.into_response(),
            Err(error) => {
                tracing::error!("Failed to retrieve expense {expense_id}: {error}");
                return error.into_response();
            }
        }
    };

    let nav_bar = NavBar::new(endpoints::EDIT_EXPENSE_VIEW).into_html();
    let update_url = format_endpoint(endpoints::EXPENSE_FORM, expense_id);
    let form = expense_form(
        ExpenseFormAction::Update(&update_url),
        &ExpenseFormDefaults {
            category: Some(expense.category),
            amount: Some(expense.amount),
            date: expense.date,
            description: expense.description.as_deref(),
        },
    );

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class={ "w-full max-w-md p-6 space-y-4 " (CARD_STYLE) }
            {
                h1 class="text-xl font-bold text-gray-900 dark:text-white" { "Edit Expense" }

                (form)

                button
                    type="button"
                    hx-delete=(update_url)
                    hx-confirm="Are you sure you want to delete this expense?"
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    };

    base("Edit Expense", &[dollar_input_styles()], &content).into_response()
}

/// A route handler for updating an expense, redirects to the dashboard on success.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let changes = match NewExpense::try_from(form) {
        Ok(changes) => changes,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_expense(expense_id, user_id, &changes, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not update expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        auth::UserID,
        endpoints::{self, format_endpoint},
        expense::{
            Amount, Category, ExpenseState, NewExpense, create_expense, form::ExpenseForm,
            get_expense,
        },
        test_utils::{
            assert_form_input_with_value, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, create_test_user, get_test_connection,
            must_get_form, parse_html_document,
        },
    };

    use super::{get_edit_expense_page, update_expense_endpoint};

    struct Fixture {
        state: ExpenseState,
        owner: UserID,
        stranger: UserID,
        expense_id: i64,
    }

    fn get_fixture() -> Fixture {
        let connection = get_test_connection();
        let owner = create_test_user("alice@example.com", &connection).id;
        let stranger = create_test_user("mallory@example.com", &connection).id;
        let expense = create_expense(
            owner,
            &NewExpense::new(
                Category::Food,
                Amount::new(Decimal::new(1250, 2)).unwrap(),
                date!(2025 - 01 - 15),
                Some("Groceries".to_owned()),
            ),
            &connection,
        )
        .unwrap();

        Fixture {
            state: ExpenseState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            owner,
            stranger,
            expense_id: expense.id,
        }
    }

    fn update_form(amount: &str) -> ExpenseForm {
        ExpenseForm {
            category: "Transportation".to_owned(),
            amount: serde_json::Value::String(amount.to_owned()),
            date: "2025-01-16".to_owned(),
            description: None,
        }
    }

    #[tokio::test]
    async fn edit_page_prefills_form() {
        let fixture = get_fixture();

        let response = get_edit_expense_page(
            State(fixture.state),
            Extension(fixture.owner),
            Path(fixture.expense_id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::EXPENSE_FORM, fixture.expense_id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "number", "12.50");
        assert_form_input_with_value(&form, "date", "date", "2025-01-15");
        assert_form_submit_button_with_text(&form, "Save Changes");

        let selected = scraper::Selector::parse("select#category option[selected]").unwrap();
        let selected = form.select(&selected).next().expect("no category selected");
        assert_eq!(selected.value().attr("value"), Some("Food"));
    }

    #[tokio::test]
    async fn edit_page_for_other_users_expense_is_not_found() {
        let fixture = get_fixture();

        let response = get_edit_expense_page(
            State(fixture.state),
            Extension(fixture.stranger),
            Path(fixture.expense_id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn can_update_expense() {
        let fixture = get_fixture();

        let response = update_expense_endpoint(
            State(fixture.state.clone()),
            Extension(fixture.owner),
            Path(fixture.expense_id),
            Form(update_form("3.5")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let connection = fixture.state.db_connection.lock().unwrap();
        let expense = get_expense(fixture.expense_id, fixture.owner, &connection).unwrap();
        assert_eq!(expense.category, Category::Transportation);
        assert_eq!(expense.amount, Amount::new(Decimal::new(35, 1)).unwrap());
        assert_eq!(expense.date, date!(2025 - 01 - 16));
        assert_eq!(expense.description, None);
    }

    #[tokio::test]
    async fn update_other_users_expense_is_not_found() {
        let fixture = get_fixture();

        let response = update_expense_endpoint(
            State(fixture.state.clone()),
            Extension(fixture.stranger),
            Path(fixture.expense_id),
            Form(update_form("3.5")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = fixture.state.db_connection.lock().unwrap();
        let expense = get_expense(fixture.expense_id, fixture.owner, &connection).unwrap();
        assert_eq!(expense.category, Category::Food);
    }

    #[tokio::test]
    async fn invalid_update_is_bad_request() {
        let fixture = get_fixture();

        let response = update_expense_endpoint(
            State(fixture.state),
            Extension(fixture.owner),
            Path(fixture.expense_id),
            Form(update_form("lots")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
