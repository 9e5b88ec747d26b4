//! The page to display when a route or resource does not exist.
use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

use crate::{error::ErrorMessage, html::error_view};

/// Renders the 404 page.
pub struct NotFoundError;

impl NotFoundError {
    fn into_html(self) -> Html<String> {
        Html(
            error_view(
                "Not Found",
                "404",
                "Something's missing.",
                "Sorry, we can't find that page. You'll find lots to explore on the home page.",
            )
            .into_string(),
        )
    }
}

impl IntoResponse for NotFoundError {
    fn into_response(self) -> Response {
        (StatusCode::NOT_FOUND, self.into_html()).into_response()
    }
}

/// Fallback handler for unknown routes.
///
/// API clients get a JSON error, everything else gets the 404 page.
pub async fn get_404_not_found(uri: Uri) -> Response {
    if uri.path().starts_with("/api") {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorMessage {
                message: format!("No route for {}", uri.path()),
            }),
        )
            .into_response();
    }

    NotFoundError.into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, Uri};

    use super::get_404_not_found;

    #[tokio::test]
    async fn page_routes_get_html() {
        let response = get_404_not_found(Uri::from_static("/nope")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/html"));
    }

    #[tokio::test]
    async fn api_routes_get_json() {
        let response = get_404_not_found(Uri::from_static("/api/nope")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");
    }
}
