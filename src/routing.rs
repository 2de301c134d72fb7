//! Application router configuration.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    AppState, endpoints,
    expense::{
        cancel_edit_endpoint, create_expense_endpoint, delete_expense_endpoint, get_edit_expense_page,
        get_expense_list, get_ledger_page, list_expenses_endpoint, update_expense_endpoint,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_ledger_page))
        .route(endpoints::EXPENSE_LIST_VIEW, get(get_expense_list))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page));

    // These routes are called by HTMX, so they redirect with the HX-Redirect header.
    let api_routes = Router::new()
        .route(
            endpoints::EXPENSES_API,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            put(update_expense_endpoint).delete(delete_expense_endpoint),
        )
        .route(endpoints::CANCEL_EDIT, post(cancel_edit_endpoint));

    page_routes
        .merge(api_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
