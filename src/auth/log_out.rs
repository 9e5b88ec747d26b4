//! Log-out route handler that ends the session, invalidates the session cookie and redirects users.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{
        LoginState, get_token_from_cookies, invalidate_session_cookie, invalidate_session_token,
    },
    endpoints,
};

/// End the session in the cookie, invalidate the cookie and redirect the client to the log-in page.
///
/// Logging out without a session still clears the cookie and redirects.
pub async fn get_log_out(State(state): State<LoginState>, jar: PrivateCookieJar) -> Response {
    if let Some(token) = get_token_from_cookies(&jar) {
        match state.db_connection.lock() {
            Ok(connection) => {
                if let Err(error) = invalidate_session_token(&token, &connection) {
                    tracing::error!("Could not end session during log out: {error}");
                }
            }
            Err(error) => tracing::error!("could not acquire database lock: {error}"),
        }
    }

    let jar = invalidate_session_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            LoginState, authenticate, cookie::COOKIE_SESSION, create_session, set_session_cookie,
        },
        endpoints,
        test_utils::{create_test_user, get_test_app_state},
    };

    use super::get_log_out;

    fn get_state() -> LoginState {
        let state = get_test_app_state();

        LoginState {
            cookie_key: state.cookie_key,
            session_duration: state.session_duration,
            db_connection: state.db_connection,
        }
    }

    #[tokio::test]
    async fn log_out_ends_session_invalidates_cookie_and_redirects() {
        let state = get_state();
        let (token, session) = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user("alice@example.com", &connection);
            create_session(user.id, Duration::minutes(5), &connection).unwrap()
        };
        let jar = set_session_cookie(
            PrivateCookieJar::new(state.cookie_key.clone()),
            &token,
            session.expires_at,
        );

        let response = get_log_out(State(state.clone()), jar).await;

        assert_redirect(&response, endpoints::LOG_IN_VIEW);
        assert_cookie_expired(&response);
        assert_eq!(
            authenticate(&token, &state.db_connection.lock().unwrap()),
            Err(Error::Unauthorized)
        );
    }

    #[tokio::test]
    async fn log_out_without_session_still_redirects() {
        let state = get_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = get_log_out(State(state), jar).await;

        assert_redirect(&response, endpoints::LOG_IN_VIEW);
        assert_cookie_expired(&response);
    }

    #[track_caller]
    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get("location").unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    #[track_caller]
    fn assert_cookie_expired(response: &Response<Body>) {
        let mut found = false;

        for cookie_header in response.headers().get_all(SET_COOKIE) {
            let cookie_string = cookie_header.to_str().unwrap();
            let cookie = Cookie::parse(cookie_string).unwrap();

            if cookie.name() != COOKIE_SESSION {
                continue;
            }

            found = true;
            assert_eq!(
                cookie.expires_datetime(),
                Some(OffsetDateTime::UNIX_EPOCH),
                "got expires {:?}, want {:?}",
                cookie.expires_datetime(),
                Some(OffsetDateTime::UNIX_EPOCH),
            );
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }

        assert!(found, "no session cookie in response");
    }
}
