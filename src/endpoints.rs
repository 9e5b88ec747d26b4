//! The page and API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}', use [format_endpoint].

/// The root route which redirects to the dashboard page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page showing the user's details and spending stats.
pub const PROFILE_VIEW: &str = "/profile";
/// The route for getting the registration page and submitting the registration form.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page and submitting the log in form.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for the client to log out the current user via the browser.
pub const LOG_OUT: &str = "/log_out";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route the dashboard form posts new expenses to.
pub const EXPENSES_FORM: &str = "/expenses";
/// The route the HTML forms use to update or delete a single expense.
pub const EXPENSE_FORM: &str = "/expenses/{expense_id}";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";

/// The route for registering a new user.
pub const SIGN_UP_API: &str = "/api/auth/signup";
/// The route for exchanging credentials for a session token.
pub const LOG_IN_API: &str = "/api/auth/login";
/// The route for ending the current session.
pub const LOG_OUT_API: &str = "/api/auth/logout";
/// The route for the current user's profile.
pub const PROFILE_API: &str = "/api/user/profile";
/// The route to list and create expenses.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to access a single expense.
pub const EXPENSE_API: &str = "/api/expenses/{expense_id}";
/// The route for the aggregated expense summary.
pub const EXPENSE_SUMMARY_API: &str = "/api/expenses/summary";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/expenses/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
