//! Defines the app level error type and conversions to rendered HTML pages, alerts and JSON.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid session token, or the session has
    /// expired or been invalidated.
    #[error("Please log in")]
    Unauthorized,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The user's name was empty or only whitespace.
    #[error("Name cannot be empty")]
    EmptyName,

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A user with the same email address already exists.
    #[error("Email is already registered")]
    DuplicateEmail,

    /// The category is not one of the fixed expense categories.
    #[error("\"{0}\" is not a valid category")]
    InvalidCategory(String),

    /// The amount could not be parsed or is negative.
    ///
    /// The string is the raw amount provided by the client.
    #[error("\"{0}\" is not a valid amount, amounts must be non-negative numbers no larger than 999999999999.99")]
    InvalidAmount(String),

    /// The date could not be parsed as a `YYYY-MM-DD` calendar date.
    #[error("\"{0}\" is not a valid date, dates must be in the format YYYY-MM-DD")]
    InvalidDate(String),

    /// The request body could not be parsed as JSON.
    #[error("Invalid request body: {0}")]
    InvalidJson(String),

    /// A path parameter, such as an expense ID, could not be parsed.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update an expense that does not exist or belongs to another user
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist or belongs to another user
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::UpdateMissingExpense | Error::DeleteMissingExpense => {
                NotFoundError.into_response()
            }
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

/// The body of every JSON error response.
#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    /// A human readable description of the error.
    pub message: String,
}

impl Error {
    /// The HTTP status code that best describes the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_)
            | Error::EmptyName
            | Error::InvalidEmail(_)
            | Error::InvalidCategory(_)
            | Error::InvalidAmount(_)
            | Error::InvalidDate(_)
            | Error::InvalidJson(_)
            | Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::NotFound | Error::UpdateMissingExpense | Error::DeleteMissingExpense => {
                StatusCode::NOT_FOUND
            }
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert the error into an HTTP response with a JSON body of the form
    /// `{"message": "..."}`.
    ///
    /// Internal errors are logged and replaced with a generic message.
    pub fn into_json_response(self) -> Response {
        let status_code = self.status_code();

        let message = match self {
            Error::NotFound | Error::UpdateMissingExpense | Error::DeleteMissingExpense => {
                "Expense not found".to_owned()
            }
            error if status_code.is_server_error() => {
                tracing::error!("An unexpected error occurred: {}", error);
                "Something went wrong, please try again later".to_owned()
            }
            error => error.to_string(),
        };

        (status_code, Json(ErrorMessage { message })).into_response()
    }

    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::InvalidCategory(_) | Error::InvalidAmount(_) | Error::InvalidDate(_) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid expense".to_owned(),
                    details: self.to_string(),
                },
            ),
            Error::UpdateMissingExpense => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update expense".to_owned(),
                    details: "The expense could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingExpense => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete expense".to_owned(),
                    details: "The expense could not be found. \
                    Try refreshing the page to see if the expense has already been deleted."
                        .to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::Error;

    async fn json_message(error: Error) -> (StatusCode, String) {
        let response = error.into_json_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");
        let json: serde_json::Value =
            serde_json::from_slice(&body).expect("Response body is not JSON");

        (status, json["message"].as_str().unwrap_or_default().to_owned())
    }

    #[tokio::test]
    async fn validation_errors_are_bad_requests_with_message() {
        let (status, message) = json_message(Error::InvalidCategory("Snacks".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "\"Snacks\" is not a valid category");
    }

    #[tokio::test]
    async fn unauthorized_asks_user_to_log_in() {
        let (status, message) = json_message(Error::Unauthorized).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Please log in");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, message) = json_message(Error::HashingError("secret detail".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("secret detail"));
    }

    #[tokio::test]
    async fn missing_expense_is_not_found() {
        let (status, message) = json_message(Error::DeleteMissingExpense).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Expense not found");
    }
}
