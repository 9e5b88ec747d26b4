//! The profile page and API endpoint showing the user's details and spending stats.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Serialize;
use time::{format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    api::{ApiError, ApiJson},
    auth::{User, UserID, get_user_by_id},
    db::lock_connection,
    endpoints,
    expense::{Amount, Expense, get_expenses},
    html::{CARD_STYLE, PAGE_CONTAINER_STYLE, base, format_currency},
    navigation::NavBar,
    timezone::get_local_offset,
};

const MEMBER_SINCE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// The state needed for the profile page and API.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The database connection for reading the user and their expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Spending stats shown on the profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileStats {
    pub expense_count: usize,
    pub total_spend: Amount,
    /// The expense with the latest date, ties going to the most recently created.
    pub latest_expense: Option<Expense>,
}

impl ProfileStats {
    /// Compute the stats for `expenses`, which may be in any order.
    pub fn new(expenses: &[Expense]) -> Self {
        let latest_expense = expenses
            .iter()
            .max_by_key(|expense| (expense.date, expense.id))
            .cloned();

        Self {
            expense_count: expenses.len(),
            total_spend: expenses.iter().map(|expense| &expense.amount).sum(),
            latest_expense,
        }
    }
}

/// The profile returned by the API.
#[derive(Debug, Serialize)]
pub struct Profile {
    pub user: User,
    pub stats: ProfileStats,
}

fn get_profile(user_id: UserID, connection: &Connection) -> Result<Profile, Error> {
    let user = get_user_by_id(user_id, connection)?;
    let expenses = get_expenses(user_id, connection)?;

    Ok(Profile {
        user,
        stats: ProfileStats::new(&expenses),
    })
}

/// The initials for the avatar: the first letter of up to two parts of `name`,
/// or "U" if the name has no letters to use.
pub fn initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|part| part.graphemes(true).next())
        .flat_map(str::chars)
        .flat_map(char::to_uppercase)
        .collect();

    if initials.is_empty() {
        "U".to_owned()
    } else {
        initials
    }
}

/// Get the caller's details and spending stats.
pub async fn get_profile_api(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<ApiJson<Profile>, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    let profile = get_profile(user_id, &connection)?;

    Ok(ApiJson(profile))
}

/// Display the caller's details and spending stats.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let profile = {
        let connection = lock_connection(&state.db_connection)?;
        get_profile(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get profile for {user_id}: {error}"))?
    };

    let member_since = profile
        .user
        .created_at
        .to_offset(local_offset)
        .format(MEMBER_SINCE_FORMAT)
        .unwrap_or_else(|_| profile.user.created_at.date().to_string());

    Ok(profile_view(&profile, &member_since).into_response())
}

fn profile_view(profile: &Profile, member_since: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();
    let user = &profile.user;
    let stats = &profile.stats;

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class={ "w-full max-w-md space-y-6 " (CARD_STYLE) }
            {
                div class="flex items-center gap-4"
                {
                    div
                        id="avatar"
                        class="flex items-center justify-center w-16 h-16 rounded-full
                            bg-blue-600 text-white text-2xl font-bold"
                        aria-hidden="true"
                    {
                        (initials(&user.name))
                    }

                    div
                    {
                        h1 class="text-2xl font-bold" { (user.name) }
                        p class="text-gray-600 dark:text-gray-400" { (user.email) }
                    }
                }

                dl id="profile-details" class="grid grid-cols-2 gap-4"
                {
                    (detail("Member since", member_since))
                    (detail("Expenses", &stats.expense_count.to_string()))
                    (detail("Total spend", &format_currency(stats.total_spend)))
                    (detail("Latest expense", &latest_expense_text(stats.latest_expense.as_ref())))
                }
            }
        }
    };

    base("Profile", &[], &content)
}

fn detail(term: &str, value: &str) -> Markup {
    html! {
        div
        {
            dt class="text-sm text-gray-600 dark:text-gray-400" { (term) }
            dd class="text-lg font-semibold" { (value) }
        }
    }
}

fn latest_expense_text(expense: Option<&Expense>) -> String {
    match expense {
        Some(expense) => format!(
            "{} on {} ({})",
            format_currency(expense.amount),
            expense.date,
            expense.category
        ),
        None => "None yet".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use scraper::Selector;
    use serde_json::{Value, json};
    use time::{Date, Duration, macros::date};

    use crate::{
        auth::{UserID, create_session},
        build_router, endpoints,
        expense::{Amount, Category, Expense, NewExpense, create_expense},
        test_utils::{
            assert_valid_html, create_test_user, get_test_app_state, get_test_connection,
            parse_html_document,
        },
    };

    use super::{ProfileState, ProfileStats, get_profile_page, initials};

    fn expense(id: i64, date: Date, cents: i64) -> Expense {
        Expense {
            id,
            owner: UserID::new(1),
            category: Category::Other,
            amount: Amount::new(Decimal::new(cents, 2)).unwrap(),
            date,
            description: None,
        }
    }

    #[test]
    fn initials_use_first_two_name_parts() {
        assert_eq!(initials("Alice Smith"), "AS");
        assert_eq!(initials("alice mary smith"), "AM");
        assert_eq!(initials("  Bob  "), "B");
        assert_eq!(initials("émile zola"), "ÉZ");
    }

    #[test]
    fn initials_default_to_u() {
        assert_eq!(initials(""), "U");
        assert_eq!(initials("   "), "U");
    }

    #[test]
    fn stats_of_no_expenses() {
        let stats = ProfileStats::new(&[]);

        assert_eq!(stats.expense_count, 0);
        assert_eq!(stats.total_spend, Amount::ZERO);
        assert_eq!(stats.latest_expense, None);
    }

    #[test]
    fn latest_expense_breaks_date_ties_by_highest_id() {
        let expenses = [
            expense(1, date!(2025 - 01 - 10), 100),
            expense(3, date!(2025 - 02 - 01), 200),
            expense(2, date!(2025 - 02 - 01), 300),
        ];

        let stats = ProfileStats::new(&expenses);

        assert_eq!(stats.expense_count, 3);
        assert_eq!(stats.total_spend, Amount::new(Decimal::new(600, 2)).unwrap());
        assert_eq!(stats.latest_expense.map(|expense| expense.id), Some(3));
    }

    #[tokio::test]
    async fn profile_page_shows_user_and_stats() {
        let connection = get_test_connection();
        let user = create_test_user("alice@example.com", &connection);
        create_expense(
            user.id,
            &NewExpense::new(
                Category::Food,
                Amount::new(Decimal::new(1250, 2)).unwrap(),
                date!(2025 - 01 - 15),
                None,
            ),
            &connection,
        )
        .unwrap();
        let state = ProfileState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_profile_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let avatar = html
            .select(&Selector::parse("#avatar").unwrap())
            .next()
            .expect("no avatar");
        assert_eq!(avatar.text().collect::<String>().trim(), "TU");

        let text: String = html.root_element().text().collect();
        assert!(text.contains("Test User"));
        assert!(text.contains("alice@example.com"));
        assert!(text.contains("$12.50 on 2025-01-15 (Food)"));
    }

    #[tokio::test]
    async fn profile_api_returns_user_and_stats() {
        let state = get_test_app_state();
        let token = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user("alice@example.com", &connection);
            for (day, cents) in [(date!(2025 - 01 - 15), 1000), (date!(2025 - 02 - 01), 250)] {
                create_expense(
                    user.id,
                    &NewExpense::new(
                        Category::Food,
                        Amount::new(Decimal::new(cents, 2)).unwrap(),
                        day,
                        None,
                    ),
                    &connection,
                )
                .unwrap();
            }
            let (token, _) = create_session(user.id, Duration::hours(1), &connection).unwrap();
            token
        };
        let server = TestServer::new(build_router(state)).expect("Could not create test server.");

        let response = server
            .get(endpoints::PROFILE_API)
            .authorization_bearer(token.as_str())
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["user"]["email"], "alice@example.com");
        assert!(body["user"].get("password_hash").is_none());
        assert_eq!(body["stats"]["expense_count"], 2);
        assert_eq!(body["stats"]["total_spend"], 12.5);
        assert_eq!(body["stats"]["latest_expense"]["date"], "2025-02-01");
        assert_eq!(body["stats"]["latest_expense"]["amount"], json!(2.5));
    }
}
