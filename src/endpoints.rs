//! The URIs of the app's pages and API endpoints.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{remote_id}', use
//! [format_endpoint].

/// The ledger page: the expense list, the total and the add form.
pub const ROOT: &str = "/";
/// The expense list and total without the rest of the page, polled for live
/// updates.
pub const EXPENSE_LIST_VIEW: &str = "/expenses/list";
/// The page for editing an expense. Visiting it opens the edit session.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{remote_id}/edit";

/// The route to create expenses and to list them as JSON.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to update or delete a single expense.
pub const EXPENSE: &str = "/api/expenses/{remote_id}";
/// The route to close the edit session without saving.
pub const CANCEL_EDIT: &str = "/api/expenses/edit/cancel";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace and ends with a
/// right brace. For example, in the endpoint path '/api/expenses/{remote_id}',
/// '{remote_id}' is the parameter. Only the first parameter is replaced.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::EXPENSE_LIST_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_EXPENSE_VIEW);

        assert_endpoint_is_valid_uri(endpoints::EXPENSES_API);
        assert_endpoint_is_valid_uri(endpoints::EXPENSE);
        assert_endpoint_is_valid_uri(endpoints::CANCEL_EDIT);
    }

    #[test]
    fn produces_valid_uri() {
        let id = "1b4e28ba-2fa1-41d2-883f-0016d3cca427";

        let formatted_path = format_endpoint(endpoints::EXPENSE, id);

        assert_eq!(
            formatted_path,
            "/api/expenses/1b4e28ba-2fa1-41d2-883f-0016d3cca427"
        );
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", "1");

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::EDIT_EXPENSE_VIEW, "abc");

        assert_eq!(formatted_path, "/expenses/abc/edit");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
