//! Defines the core data models and database queries for expenses.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::Date;

use crate::{Error, auth::UserID, database_id::ExpenseId};

use super::{Amount, Category};

// ============================================================================
// MODELS
// ============================================================================

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Money spent by a user on a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The user who recorded the expense.
    #[serde(skip_serializing)]
    pub owner: UserID,
    pub category: Category,
    pub amount: Amount,
    /// When the money was spent.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// What the money was spent on, if the user said.
    pub description: Option<String>,
}

/// The validated fields needed to create or update an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub category: Category,
    pub amount: Amount,
    pub date: Date,
    pub description: Option<String>,
}

impl NewExpense {
    /// Create the fields for an expense.
    ///
    /// Descriptions that are empty or only whitespace are stored as `None`.
    pub fn new(category: Category, amount: Amount, date: Date, description: Option<String>) -> Self {
        let description = description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());

        Self {
            category,
            amount,
            date,
            description,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new expense owned by `owner`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g. `owner` does not refer to a registered user.
pub fn create_expense(
    owner: UserID,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "INSERT INTO expense (user_id, category, amount, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, user_id, category, amount, date, description",
        )?
        .query_row(
            (
                owner.as_i64(),
                expense.category,
                expense.amount,
                expense.date,
                expense.description.as_deref(),
            ),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve the expense with `id` that belongs to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by `owner`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, owner: UserID, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "SELECT id, user_id, category, amount, date, description
             FROM expense WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &owner.as_i64())],
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve all of `owner`'s expenses, newest first.
///
/// Expenses on the same date are ordered by descending ID so the most
/// recently created comes first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_expenses(owner: UserID, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category, amount, date, description
             FROM expense WHERE user_id = :user_id
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &owner.as_i64())], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Replace the fields of the expense with `id` that belongs to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingExpense] if `id` does not refer to an expense owned by `owner`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    owner: UserID,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(
            "UPDATE expense
             SET category = ?1, amount = ?2, date = ?3, description = ?4
             WHERE id = ?5 AND user_id = ?6
             RETURNING id, user_id, category, amount, date, description",
        )?
        .query_row(
            (
                expense.category,
                expense.amount,
                expense.date,
                expense.description.as_deref(),
                id,
                owner.as_i64(),
            ),
            map_expense_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingExpense,
            error => error.into(),
        })
}

/// Delete the expense with `id` that belongs to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingExpense] if `id` does not refer to an expense owned by `owner`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_expense(id: ExpenseId, owner: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL CHECK (category IN (
                    'Food', 'Transportation', 'Housing', 'Entertainment', 'Utilities',
                    'Healthcare', 'Education', 'Shopping', 'Other'
                )),
                amount TEXT NOT NULL CHECK (CAST(amount AS REAL) >= 0),
                date TEXT NOT NULL,
                description TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Every page load fetches a single user's expenses by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to an Expense.
fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let owner = UserID::new(row.get(1)?);
    let category = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;
    let description = row.get(5)?;

    Ok(Expense {
        id,
        owner,
        category,
        amount,
        date,
        description,
    })
}

// ============================================================================
// TESTS
// ============================================================================
