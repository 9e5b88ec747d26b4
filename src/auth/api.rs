//! JSON endpoints for signing up, logging in and logging out.

use axum::{Extension, extract::State, http::StatusCode};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    api::{ApiError, ApiJson},
    auth::{
        LoginState, RegistrationState, Session, SignUpData, User, check_credentials,
        invalidate_session, invalidate_session_cookie, sign_up, start_session,
        user::serialize_rfc3339,
    },
    db::lock_connection,
};

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    message: &'static str,
    user: User,
}

/// Create a new user.
///
/// Responds with 201 and the new user, 409 if the email is already
/// registered, or 400 if any of the details are invalid.
pub async fn sign_up_api(
    State(state): State<RegistrationState>,
    ApiJson(data): ApiJson<SignUpData>,
) -> Result<(StatusCode, ApiJson<SignUpResponse>), ApiError> {
    let user = sign_up(&data, state.password_hash_cost, &state.db_connection)?;

    Ok((
        StatusCode::CREATED,
        ApiJson(SignUpResponse {
            message: "User registered successfully",
            user,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LogInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LogInResponse {
    /// The bearer token to send in the `Authorization` header.
    token: String,
    #[serde(serialize_with = "serialize_rfc3339")]
    expires_at: OffsetDateTime,
    user: User,
}

/// Check the credentials and start a session.
///
/// Responds with the bearer token for the session, or 401 if the email or
/// password is wrong.
pub async fn log_in_api(
    State(state): State<LoginState>,
    ApiJson(request): ApiJson<LogInRequest>,
) -> Result<ApiJson<LogInResponse>, ApiError> {
    let user = check_credentials(&request.email, &request.password, &state.db_connection)?;
    let (token, session) = start_session(&user, state.session_duration, &state.db_connection)?;
    tracing::info!("User {} logged in", user.id);

    Ok(ApiJson(LogInResponse {
        token: token.as_str().to_owned(),
        expires_at: session.expires_at,
        user,
    }))
}

/// End the caller's session. The session cookie is cleared as well in case
/// the session came from a cookie.
pub async fn log_out_api(
    State(state): State<LoginState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, StatusCode), ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    invalidate_session(&session, &connection)?;

    Ok((invalidate_session_cookie(jar), StatusCode::NO_CONTENT))
}
