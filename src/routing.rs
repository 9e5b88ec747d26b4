//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_api, auth_guard_hx, get_log_in_page, get_log_out,
        get_register_page, log_in_api, log_out_api, post_log_in, register_user, sign_up_api,
    },
    dashboard::get_dashboard_page,
    endpoints,
    expense::{
        create_expense_api, create_expense_endpoint, delete_expense_api, delete_expense_endpoint,
        get_edit_expense_page, get_expense_api, get_expense_summary_api, list_expenses_api,
        update_expense_api, update_expense_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    logging::logging_middleware,
    not_found::get_404_not_found,
    profile::{get_profile_api, get_profile_page},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in),
        )
        .route(
            endpoints::REGISTER_VIEW,
            get(get_register_page).post(register_user),
        )
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .route(endpoints::SIGN_UP_API, post(sign_up_api))
        .route(endpoints::LOG_IN_API, post(log_in_api));

    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let htmx_routes = Router::new()
        .route(endpoints::EXPENSES_FORM, post(create_expense_endpoint))
        .route(
            endpoints::EXPENSE_FORM,
            axum::routing::put(update_expense_endpoint).delete(delete_expense_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

    let api_routes = Router::new()
        .route(endpoints::LOG_OUT_API, post(log_out_api))
        .route(endpoints::PROFILE_API, get(get_profile_api))
        .route(
            endpoints::EXPENSES_API,
            get(list_expenses_api).post(create_expense_api),
        )
        .route(endpoints::EXPENSE_SUMMARY_API, get(get_expense_summary_api))
        .route(
            endpoints::EXPENSE_API,
            get(get_expense_api)
                .put(update_expense_api)
                .delete(delete_expense_api),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_api));

    page_routes
        .merge(htmx_routes)
        .merge(api_routes)
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}


#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::{build_router, endpoints, test_utils::get_test_app_state};

    fn get_test_server() -> TestServer {
        TestServer::new(build_router(get_test_app_state())).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_when_logged_out() {
        let server = get_test_server();

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.header("location");
        assert!(
            location
                .to_str()
                .unwrap()
                .starts_with(&format!("{}?redirect_url=", endpoints::LOG_IN_VIEW)),
            "got {location:?}"
        );
    }

    #[tokio::test]
    async fn htmx_routes_redirect_to_log_in_when_logged_out() {
        let server = get_test_server();

        let response = server.post(endpoints::EXPENSES_FORM).await;

        response.assert_status_ok();
        assert!(
            response
                .header("hx-redirect")
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn public_pages_are_available() {
        let server = get_test_server();

        server.get(endpoints::LOG_IN_VIEW).await.assert_status_ok();
        server.get(endpoints::REGISTER_VIEW).await.assert_status_ok();
        server
            .get(endpoints::INTERNAL_ERROR_VIEW)
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let server = get_test_server();

        server
            .get("/does/not/exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
