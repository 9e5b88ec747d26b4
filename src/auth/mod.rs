//! User accounts, password and session handling, and the log-in, registration and log-out flows.

mod api;
mod cookie;
mod credentials;
mod email;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod register;
mod session;
mod user;

pub use api::{log_in_api, log_out_api, sign_up_api};
pub(crate) use cookie::{get_token_from_cookies, invalidate_session_cookie, set_session_cookie};
pub use credentials::{SignUpData, check_credentials, sign_up, start_session};
pub use email::Email;
pub use log_in::{LoginState, get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_api, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use redirect::{build_log_in_redirect_url, normalize_redirect_url};
pub use register::{RegistrationState, get_register_page, register_user};
pub use session::{
    Session, SessionToken, authenticate, create_session, create_session_table,
    delete_expired_sessions, extend_session, invalidate_session, invalidate_session_token,
};
pub use user::{User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id};
pub(crate) use user::serialize_rfc3339;

#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;
