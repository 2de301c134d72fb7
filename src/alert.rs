//! Alert system for displaying success and error messages to users.
//!
//! Alerts are HTML fragments that htmx swaps into the `#alert-container`
//! element of the base page.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// A success or error message, optionally with details on how to fix it.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String, details: String },
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::Success { message, details } => (false, message, details),
            Alert::Error { message, details } => (true, message, details),
            Alert::ErrorSimple { message } => (true, message, String::new()),
        };

        let container_style = if is_error {
            "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
            dark:bg-gray-800 dark:text-red-400 border border-red-300 dark:border-red-800"
        } else {
            "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
            dark:bg-gray-800 dark:text-green-400 border border-green-300 dark:border-green-800"
        };

        html! {
            div
                role="alert"
                class=(container_style)
                onclick="this.remove()"
            {
                p class="font-medium" { (message) }

                @if !details.is_empty() {
                    p class="mt-1" { (details) }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Selector;

    use crate::test_utils::{assert_content_type, assert_valid_html, parse_html_fragment};

    use super::Alert;

    #[tokio::test]
    async fn error_alert_shows_message_then_details() {
        let response = Alert::Error {
            message: "Could not delete expense".to_owned(),
            details: "Try again.".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let paragraphs: Vec<String> = html
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect();
        assert_eq!(paragraphs, ["Could not delete expense", "Try again."]);
    }

    #[tokio::test]
    async fn simple_alert_has_no_details() {
        let html = Alert::ErrorSimple {
            message: "Expense name cannot be empty".to_owned(),
        }
        .into_html()
        .into_string();

        assert_eq!(html.matches("<p").count(), 1);
        assert!(html.contains("text-red-800"));
    }
}
