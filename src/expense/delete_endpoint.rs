//! Defines the endpoint for deleting an expense.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    app_state::ExpenseState, endpoints, expense::RemoteId, projection::RecordAction,
};

/// A route handler for deleting an expense.
///
/// The delete button asks the user for confirmation before sending the
/// request. Redirects to the ledger page once the expense is gone from the
/// ledger.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(remote_id): Path<RemoteId>,
) -> Response {
    let mut tracker = state.tracker.lock().await;
    let result = tracker.dispatch(RecordAction::delete(remote_id.clone())).await;

    if let Err(error) = result {
        return error.into_alert_response();
    }

    let engine = tracker.engine().clone();
    drop(tracker);

    match engine
        .wait_until(|ledger| !ledger.contains(&remote_id))
        .await
    {
        Ok(_) => (
            HxRedirect(endpoints::ROOT.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}
