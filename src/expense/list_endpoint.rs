//! Lists the expenses as JSON, in display order.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;

use crate::{
    Error,
    app_state::ExpenseState,
    projection::{Projection, SortSpec},
    sync::SyncStatus,
    timezone::local_today,
};

/// The JSON body returned by [list_expenses_endpoint].
#[derive(Debug, Serialize)]
pub struct ExpenseListResponse {
    /// Whether the list is live or may be out of date.
    pub status: SyncStatus,
    /// The sorted rows and total, flattened into the top-level object.
    #[serde(flatten)]
    pub projection: Projection,
}

/// A route handler for listing the expenses, sorted by the `sort` and
/// `order` query parameters.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    Query(sort): Query<SortSpec>,
) -> Result<Json<ExpenseListResponse>, Error> {
    let today = local_today(&state.local_timezone)?;
    let tracker = state.tracker.lock().await;

    Ok(Json(ExpenseListResponse {
        status: tracker.ledger().status().clone(),
        projection: tracker.view(sort, today),
    }))
}
