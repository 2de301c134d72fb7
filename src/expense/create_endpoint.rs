//! Defines the endpoint for adding an expense.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error, app_state::ExpenseState, endpoints, expense::ledger_page::add_expense_form_view,
    validation::{ExpenseForm, FormKind},
};

/// A route handler for adding an expense.
///
/// Redirects to the ledger page once the new expense has arrived in a
/// snapshot. An invalid form is sent back with the invalid fields marked.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let mut tracker = state.tracker.lock().await;
    let result = tracker.add(&form).await;

    match result {
        Ok(id) => {
            let engine = tracker.engine().clone();
            drop(tracker);

            match engine.wait_until(|ledger| ledger.contains(&id)).await {
                Ok(_) => (
                    HxRedirect(endpoints::ROOT.to_owned()),
                    StatusCode::SEE_OTHER,
                )
                    .into_response(),
                Err(error) => error.into_alert_response(),
            }
        }
        Err(Error::InvalidExpense(validity)) => {
            tracing::debug!("rejected new expense: {validity}");
            add_expense_form_view(&form, tracker.forms().form(FormKind::Add)).into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input_with_value, assert_hx_redirect, assert_valid_html,
            form_error_messages, must_create_expense_state, must_get_form, parse_html_fragment,
        },
        validation::{ExpenseForm, FormKind},
    };

    use super::create_expense_endpoint;

    fn form(name: &str, amount: &str, date: &str) -> ExpenseForm {
        ExpenseForm {
            name: name.to_owned(),
            amount: amount.to_owned(),
            date: date.to_owned(),
        }
    }

    #[tokio::test]
    async fn creates_expense_and_redirects() {
        let state = must_create_expense_state().await;

        let response =
            create_expense_endpoint(State(state.clone()), Form(form("Coffee", "3.50", ""))).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ROOT);
        let tracker = state.tracker.lock().await;
        let ledger = tracker.ledger();
        assert_eq!(ledger.len(), 1);
        let expense = &ledger.expenses()[0];
        assert_eq!(expense.name.as_ref(), "Coffee");
        assert_eq!(expense.amount, 3.5);
        assert_eq!(expense.date, None);
        assert!(!tracker.forms().form(FormKind::Add).is_touched());
    }

    #[tokio::test]
    async fn invalid_amount_returns_form_with_error() {
        let state = must_create_expense_state().await;

        let response =
            create_expense_endpoint(State(state.clone()), Form(form("Coffee", "abc", ""))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "name", "text", "Coffee");
        assert_eq!(form_error_messages(&form), ["Enter an amount, e.g. 3.50."]);
        assert!(state.tracker.lock().await.ledger().is_empty());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let state = must_create_expense_state().await;

        let response =
            create_expense_endpoint(State(state.clone()), Form(form("   ", "1", ""))).await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_eq!(
            form_error_messages(&form),
            ["Enter what the money was spent on."]
        );
        assert!(state.tracker.lock().await.ledger().is_empty());
    }
}
