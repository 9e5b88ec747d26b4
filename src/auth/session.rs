//! Server-side sessions that bind a bearer token to a user until the session
//! expires or is invalidated.
//!
//! Only the SHA-256 hash of a token is stored. The raw token is handed to the
//! client once, at log-in, and presented on later requests.

use std::cmp::max;

use rusqlite::{Connection, Row, types::Type};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, auth::UserID};

/// The opaque secret a client presents to prove it holds a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a new random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap a token presented by a client, e.g. from an `Authorization` header.
    pub fn from_raw(raw_token: &str) -> Self {
        Self(raw_token.trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn hash(&self) -> String {
        format!("{:x}", Sha256::digest(self.0.as_bytes()))
    }
}

/// A live session for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The session's ID in the application database.
    pub id: i64,
    /// The user the session belongs to.
    pub user_id: UserID,
    /// When the session stops being accepted.
    pub expires_at: OffsetDateTime,
}

/// Create the session table.
///
/// The user table must exist before calling this function.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                token_hash TEXT NOT NULL UNIQUE,
                expires_at INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Start a new session for `user_id` that lasts for `duration`.
///
/// Returns the raw token, which must be given to the client, along with the
/// session.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the session could not be stored.
pub fn create_session(
    user_id: UserID,
    duration: Duration,
    connection: &Connection,
) -> Result<(SessionToken, Session), Error> {
    let token = SessionToken::generate();
    let expires_at = OffsetDateTime::now_utc() + duration;

    let session = connection
        .prepare(
            "INSERT INTO session (user_id, token_hash, expires_at) VALUES (?1, ?2, ?3)
             RETURNING id, user_id, expires_at",
        )?
        .query_row(
            (user_id.as_i64(), token.hash(), expires_at.unix_timestamp()),
            map_session_row,
        )?;

    Ok((token, session))
}

/// Resolve `token` to its session.
///
/// An expired session is deleted before the error is returned.
///
/// # Errors
///
/// Returns:
/// - [Error::Unauthorized] if the token does not belong to a session or the session has expired,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn authenticate(token: &SessionToken, connection: &Connection) -> Result<Session, Error> {
    let session = connection
        .prepare("SELECT id, user_id, expires_at FROM session WHERE token_hash = :token_hash")?
        .query_one(&[(":token_hash", &token.hash())], map_session_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::Unauthorized,
            error => error,
        })?;

    if session.expires_at <= OffsetDateTime::now_utc() {
        tracing::debug!("Session {} for user {} has expired", session.id, session.user_id);
        invalidate_session(&session, connection)?;
        return Err(Error::Unauthorized);
    }

    Ok(session)
}

/// Push the expiry of `session` out to `duration` from now, unless it already
/// expires later than that.
///
/// # Errors
///
/// Returns:
/// - [Error::Unauthorized] if the session no longer exists,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn extend_session(
    session: &Session,
    duration: Duration,
    connection: &Connection,
) -> Result<Session, Error> {
    let expires_at = max(session.expires_at, OffsetDateTime::now_utc() + duration);

    connection
        .prepare(
            "UPDATE session SET expires_at = :expires_at WHERE id = :id
             RETURNING id, user_id, expires_at",
        )?
        .query_one(
            rusqlite::named_params! {
                ":expires_at": expires_at.unix_timestamp(),
                ":id": session.id,
            },
            map_session_row,
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::Unauthorized,
            error => error,
        })
}

/// End `session`. Its token is rejected from then on.
///
/// Invalidating a session that has already been removed is not an error.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the session could not be deleted.
pub fn invalidate_session(session: &Session, connection: &Connection) -> Result<(), Error> {
    connection.execute("DELETE FROM session WHERE id = ?1", (session.id,))?;

    Ok(())
}

/// End the session that `token` belongs to, if there is one.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the session could not be deleted.
pub fn invalidate_session_token(token: &SessionToken, connection: &Connection) -> Result<(), Error> {
    connection.execute("DELETE FROM session WHERE token_hash = ?1", (token.hash(),))?;

    Ok(())
}

/// Remove every session that has expired, returning how many were removed.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the sessions could not be deleted.
pub fn delete_expired_sessions(connection: &Connection) -> Result<usize, Error> {
    let deleted = connection.execute(
        "DELETE FROM session WHERE expires_at <= ?1",
        (OffsetDateTime::now_utc().unix_timestamp(),),
    )?;

    Ok(deleted)
}

fn map_session_row(row: &Row) -> Result<Session, rusqlite::Error> {
    Ok(Session {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        expires_at: timestamp_from_row(row, 2)?,
    })
}

/// Read a unix timestamp column as a UTC date time.
pub(crate) fn timestamp_from_row(
    row: &Row,
    index: usize,
) -> Result<OffsetDateTime, rusqlite::Error> {
    let timestamp: i64 = row.get(index)?;

    OffsetDateTime::from_unix_timestamp(timestamp).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}
