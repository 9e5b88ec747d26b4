//! The registration page for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{SignUpData, set_session_cookie, sign_up, start_session},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base,
        loading_spinner, log_in_register, password_input, text_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

/// Error messages shown next to the registration form inputs.
#[derive(Debug, Default)]
struct RegistrationErrors<'a> {
    name: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(name: &str, email: &str, errors: &RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER_VIEW)
            hx-target="this"
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("name", "Name", "text", name, errors.name))
            (text_input("email", "Email", "email", email, errors.email))
            (password_input(PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", "", &RegistrationErrors::default());
    let content = log_in_register("Create an account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session stays valid after it was last used.
    pub session_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_duration: state.session_duration,
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Create a new account and log the user in.
///
/// Validation errors are shown next to the relevant input.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let re_render = |errors: RegistrationErrors| {
        registration_form(&user_data.name, &user_data.email, &errors).into_response()
    };

    if user_data.password != user_data.confirm_password {
        return re_render(RegistrationErrors {
            confirm_password: Some("Passwords do not match"),
            ..Default::default()
        });
    }

    let sign_up_data = SignUpData {
        name: user_data.name.clone(),
        email: user_data.email.clone(),
        password: user_data.password.clone(),
    };

    let user = match sign_up(
        &sign_up_data,
        state.password_hash_cost,
        &state.db_connection,
    ) {
        Ok(user) => user,
        Err(error @ Error::EmptyName) => {
            return re_render(RegistrationErrors {
                name: Some(&error.to_string()),
                ..Default::default()
            });
        }
        Err(error @ (Error::InvalidEmail(_) | Error::DuplicateEmail)) => {
            return re_render(RegistrationErrors {
                email: Some(&error.to_string()),
                ..Default::default()
            });
        }
        Err(error @ Error::TooWeak(_)) => {
            return re_render(RegistrationErrors {
                password: Some(&error.to_string()),
                ..Default::default()
            });
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");

            return get_internal_server_error_redirect();
        }
    };

    match start_session(&user, state.session_duration, &state.db_connection) {
        Ok((token, session)) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            set_session_cookie(jar, &token, session.expires_at),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while starting a session: {error}");

            get_internal_server_error_redirect()
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::{TestResponse, TestServer};
    use scraper::{Html, Selector};

    use crate::{
        AppState,
        auth::{cookie::COOKIE_SESSION, get_user_by_email, Email},
        endpoints,
        test_utils::{TEST_PASSWORD, create_test_user, get_test_app_state},
    };

    use super::{RegistrationState, register_user};

    fn get_test_server(state: &AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::REGISTER_VIEW, post(register_user))
            .with_state(RegistrationState {
                cookie_key: state.cookie_key.clone(),
                session_duration: state.session_duration,
                password_hash_cost: state.password_hash_cost,
                db_connection: state.db_connection.clone(),
            });

        TestServer::new(app).expect("Could not create test server.")
    }

    async fn post_registration(
        server: &TestServer,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> TestResponse {
        server
            .post(endpoints::REGISTER_VIEW)
            .form(&[
                ("name", name),
                ("email", email),
                ("password", password),
                ("confirm_password", confirm_password),
            ])
            .await
    }

    #[track_caller]
    fn assert_error_after(response: &TestResponse, input_selector: &str, want: &str) {
        let fragment = Html::parse_fragment(&response.text());
        let selector = Selector::parse(&format!("{input_selector} + p.text-red-500")).unwrap();
        let error = fragment
            .select(&selector)
            .next()
            .unwrap_or_else(|| panic!("no error message after {input_selector}"));

        assert_eq!(error.text().collect::<String>().trim(), want);
    }

    #[tokio::test]
    async fn register_user_succeeds() {
        let state = get_test_app_state();
        let server = get_test_server(&state);

        let response = post_registration(
            &server,
            "Alice Smith",
            "alice@example.com",
            TEST_PASSWORD,
            TEST_PASSWORD,
        )
        .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::DASHBOARD_VIEW);
        let _ = response.cookie(COOKIE_SESSION);

        let connection = state.db_connection.lock().unwrap();
        let user =
            get_user_by_email(&Email::new("alice@example.com").unwrap(), &connection).unwrap();
        assert_eq!(user.name, "Alice Smith");
    }

    #[tokio::test]
    async fn register_user_fails_with_mismatched_passwords() {
        let state = get_test_app_state();
        let server = get_test_server(&state);

        let response = post_registration(
            &server,
            "Alice",
            "alice@example.com",
            TEST_PASSWORD,
            "something else entirely",
        )
        .await;

        response.assert_status_ok();
        assert_error_after(&response, "input#confirm-password", "Passwords do not match");
    }

    #[tokio::test]
    async fn register_user_fails_with_weak_password() {
        let state = get_test_app_state();
        let server = get_test_server(&state);

        let response =
            post_registration(&server, "Alice", "alice@example.com", "password", "password").await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        let selector = Selector::parse("input#password + p.text-red-500").unwrap();
        assert!(fragment.select(&selector).next().is_some());
    }

    #[tokio::test]
    async fn register_user_fails_with_duplicate_email() {
        let state = get_test_app_state();
        create_test_user("alice@example.com", &state.db_connection.lock().unwrap());
        let server = get_test_server(&state);

        let response = post_registration(
            &server,
            "Alice",
            "alice@example.com",
            TEST_PASSWORD,
            TEST_PASSWORD,
        )
        .await;

        response.assert_status_ok();
        assert_error_after(&response, "input#email", "Email is already registered");
    }

    #[tokio::test]
    async fn register_user_fails_with_empty_name() {
        let state = get_test_app_state();
        let server = get_test_server(&state);

        let response = post_registration(
            &server,
            "  ",
            "alice@example.com",
            TEST_PASSWORD,
            TEST_PASSWORD,
        )
        .await;

        response.assert_status_ok();
        assert_error_after(&response, "input#name", "Name cannot be empty");
    }
}
