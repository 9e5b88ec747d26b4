#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

use rusqlite::Connection;

use crate::{
    AppState,
    app_state::DEFAULT_SESSION_DURATION,
    auth::{Email, PasswordHash, User, ValidatedPassword, create_user},
    db::initialize,
};

pub(crate) use form::{
    assert_form_input, assert_form_input_with_value, assert_form_submit_button,
    assert_form_submit_button_with_text, assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok};

/// The password every test user is created with.
pub(crate) const TEST_PASSWORD: &str = "Lq7#vZ2m!Rp9tW4x";

/// The bcrypt cost used in tests, low enough to keep tests fast.
pub(crate) const TEST_HASH_COST: u32 = 4;

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

#[track_caller]
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> User {
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        TEST_HASH_COST,
    )
    .expect("Could not hash test password");
    let email = Email::new(email).expect("Invalid test email");

    create_user("Test User", &email, password_hash, connection).expect("Could not create test user")
}

pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    let mut state = AppState::new(connection, "foobar", "Etc/UTC", DEFAULT_SESSION_DURATION)
        .expect("Could not create app state");
    state.password_hash_cost = TEST_HASH_COST;

    state
}
