//! Authentication middleware that resolves sessions, extends them, and handles
//! unauthenticated requests for API, page and htmx routes.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::{
    TypedHeader,
    extract::{PrivateCookieJar, cookie::Key},
    headers::{Authorization, authorization::Bearer},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        SessionToken, authenticate, build_log_in_redirect_url,
        cookie::{get_token_from_cookies, invalidate_session_cookie, set_session_cookie},
        extend_session,
        redirect::build_log_in_redirect_url_from_target,
    },
    db::lock_connection,
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session stays valid after it was last used.
    pub session_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Which kind of route a guard protects, deciding how failures are reported.
#[derive(Debug, Clone, Copy)]
enum Guarded {
    /// JSON API routes answer with a JSON error.
    Api,
    /// Full pages redirect to the log-in page.
    Page,
    /// htmx endpoints ask htmx to redirect the whole page.
    Htmx,
}

impl Guarded {
    fn log_in_redirect_url(self, parts: &Parts) -> String {
        let from_hx_current_url = matches!(self, Guarded::Htmx);

        build_log_in_redirect_url(&parts.uri, &parts.headers, from_hx_current_url).unwrap_or_else(
            || {
                tracing::warn!("Invalid redirect URL from request. Falling back to dashboard.");

                build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
                    .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
            },
        )
    }

    fn unauthorized(self, parts: &Parts) -> Response {
        match self {
            Guarded::Api => Error::Unauthorized.into_json_response(),
            Guarded::Page => Redirect::to(&self.log_in_redirect_url(parts)).into_response(),
            Guarded::Htmx => {
                (HxRedirect(self.log_in_redirect_url(parts)), StatusCode::OK).into_response()
            }
        }
    }

    fn error(self, error: Error) -> Response {
        match self {
            Guarded::Api => error.into_json_response(),
            Guarded::Page => error.into_response(),
            Guarded::Htmx => error.into_alert_response(),
        }
    }
}

/// Checks for a bearer token or session cookie that belongs to a live session.
///
/// The user ID and [super::Session] are placed into the request extensions and
/// the request executed normally if the session is valid. The session is
/// extended on every use, and when it came from a cookie the cookie's expiry
/// is updated to match.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    guarded: Guarded,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let bearer_token =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state)
            .await
            .ok()
            .map(|TypedHeader(Authorization(bearer))| SessionToken::from_raw(bearer.token()));
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}");
            return guarded.unauthorized(&parts);
        }
    };

    let (token, from_cookie) = match (bearer_token, get_token_from_cookies(&jar)) {
        (Some(token), _) => (token, false),
        (None, Some(token)) => (token, true),
        (None, None) => return guarded.unauthorized(&parts),
    };

    let session = lock_connection(&state.db_connection).and_then(|connection| {
        let session = authenticate(&token, &connection)?;
        extend_session(&session, state.session_duration, &connection)
    });

    let session = match session {
        Ok(session) => session,
        Err(Error::Unauthorized) if from_cookie => {
            return (invalidate_session_cookie(jar), guarded.unauthorized(&parts)).into_response();
        }
        Err(Error::Unauthorized) => return guarded.unauthorized(&parts),
        Err(error) => return guarded.error(error),
    };

    parts.extensions.insert(session.user_id);
    parts.extensions.insert(session.clone());
    let response = next.run(Request::from_parts(parts, body)).await;

    if !from_cookie {
        return response;
    }

    let (mut parts, body) = response.into_parts();

    // Handlers that set the cookie themselves, e.g. log out, take precedence.
    if parts.headers.contains_key(SET_COOKIE) {
        return Response::from_parts(parts, body);
    }

    let jar = set_session_cookie(jar, &token, session.expires_at);
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware for JSON API routes, answering unauthenticated requests with
/// 401 and a JSON message.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard_api(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, Guarded::Api).await
}

/// Middleware for page routes, redirecting unauthenticated requests to the log-in page.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, Guarded::Page).await
}

/// Middleware for htmx endpoints, answering unauthenticated requests with an
/// HTMX redirect to the log-in page.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, Guarded::Htmx).await
}
