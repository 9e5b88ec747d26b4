//! Defines functions for carrying a session token in an encrypted cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use super::SessionToken;

pub(crate) const COOKIE_SESSION: &str = "session";

/// Add the session cookie to the cookie jar, indicating that a user is logged in.
///
/// The cookie expires at the same time as the session it refers to.
///
/// Returns the cookie jar with the cookie added.
pub(crate) fn set_session_cookie(
    jar: PrivateCookieJar,
    token: &SessionToken,
    expires_at: OffsetDateTime,
) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, token.as_str().to_owned()))
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the session token from the cookie jar, if there is one.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Option<SessionToken> {
    jar.get(COOKIE_SESSION)
        .map(|cookie| SessionToken::from_raw(cookie.value_trimmed()))
        .filter(|token| !token.as_str().is_empty())
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::auth::SessionToken;

    use super::{
        COOKIE_SESSION, get_token_from_cookies, invalidate_session_cookie, set_session_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    #[test]
    fn can_set_cookie() {
        let token = SessionToken::generate();
        let expires_at = OffsetDateTime::now_utc() + Duration::minutes(5);

        let jar = set_session_cookie(get_jar(), &token, expires_at);
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(cookie.value(), token.as_str());
        assert_eq!(cookie.expires_datetime(), Some(expires_at));
        assert_eq!(get_token_from_cookies(&jar), Some(token));
    }

    #[test]
    fn missing_cookie_has_no_token() {
        assert_eq!(get_token_from_cookies(&get_jar()), None);
    }

    #[test]
    fn invalidate_session_cookie_succeeds() {
        let token = SessionToken::generate();
        let jar = set_session_cookie(
            get_jar(),
            &token,
            OffsetDateTime::now_utc() + Duration::minutes(5),
        );

        let jar = invalidate_session_cookie(jar);
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_ne!(get_token_from_cookies(&jar), Some(token));
    }
}
