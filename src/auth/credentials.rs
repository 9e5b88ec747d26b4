//! Signing up, checking log-in credentials, and starting sessions.
//!
//! These functions lock the database only for their queries so that password
//! hashing does not hold up other requests.

use std::sync::Mutex;

use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    Error,
    auth::{
        Email, PasswordHash, Session, SessionToken, User, ValidatedPassword, create_session,
        create_user, delete_expired_sessions, get_user_by_email,
    },
    db::lock_connection,
};

/// The details a new user signs up with.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpData {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validate `data`, hash the password and create the user.
///
/// # Errors
///
/// Returns:
/// - [Error::EmptyName] if the name is empty after trimming,
/// - [Error::InvalidEmail] if the email is not a valid address,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::DuplicateEmail] if the email is already registered,
/// - [Error::HashingError], [Error::DatabaseLockError] or [Error::SqlError] for internal failures.
pub fn sign_up(
    data: &SignUpData,
    password_hash_cost: u32,
    db_connection: &Mutex<Connection>,
) -> Result<User, Error> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let email = Email::new(&data.email)?;
    let password = ValidatedPassword::new(&data.password, &[name, email.as_str()])?;
    let password_hash = PasswordHash::new(password, password_hash_cost)?;

    let connection = lock_connection(db_connection)?;
    let user = create_user(name, &email, password_hash, &connection)?;
    tracing::info!("User {} signed up", user.id);

    Ok(user)
}

/// Find the user registered with `raw_email` and check their password.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if there is no such user or the password
/// is wrong, without saying which. Internal failures are returned as is.
pub fn check_credentials(
    raw_email: &str,
    password: &str,
    db_connection: &Mutex<Connection>,
) -> Result<User, Error> {
    let email = Email::new(raw_email).map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = lock_connection(db_connection)?;
        get_user_by_email(&email, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    match user.password_hash.verify(password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}

/// Start a session for `user`, clearing out expired sessions first.
///
/// # Errors
///
/// Returns [Error::DatabaseLockError] or [Error::SqlError] if the session
/// could not be stored.
pub fn start_session(
    user: &User,
    duration: Duration,
    db_connection: &Mutex<Connection>,
) -> Result<(SessionToken, Session), Error> {
    let connection = lock_connection(db_connection)?;

    match delete_expired_sessions(&connection) {
        Ok(0) => {}
        Ok(count) => tracing::debug!("Removed {count} expired sessions"),
        Err(error) => tracing::warn!("Could not remove expired sessions: {error}"),
    }

    create_session(user.id, duration, &connection)
}
