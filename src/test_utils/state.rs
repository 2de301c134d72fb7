use crate::{
    AppState,
    app_state::ExpenseState,
    expense::RemoteId,
    sync::tests::{input, must_start_engine},
};

/// App state over an empty in-memory store, with the ledger already live.
pub(crate) async fn must_create_app_state() -> AppState {
    AppState::new(must_start_engine().await, "Etc/UTC")
}

pub(crate) async fn must_create_expense_state() -> ExpenseState {
    let state = must_create_app_state().await;

    ExpenseState {
        tracker: state.tracker,
        local_timezone: state.local_timezone,
    }
}

/// Create an expense through the engine and wait for it to reach the ledger.
pub(crate) async fn must_create_expense(state: &ExpenseState, name: &str, amount: f64) -> RemoteId {
    let engine = state.tracker.lock().await.engine().clone();
    let id = engine
        .create(input(name, amount))
        .await
        .expect("could not create test expense");
    engine
        .wait_until(|ledger| ledger.contains(&id))
        .await
        .expect("test expense should arrive in a snapshot");

    id
}
