//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use axum::extract::FromRef;
use tokio::sync::Mutex;

use crate::{store::SqliteDocumentStore, sync::SyncEngine, tracker::ExpenseTracker};

/// The tracker shared by every request handler.
///
/// User actions lock the tracker, so they are applied one at a time.
pub type SharedTracker = Arc<Mutex<ExpenseTracker<SqliteDocumentStore>>>;

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The expense tracker holding the form and edit session state.
    pub tracker: SharedTracker,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] around a running `engine`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    pub fn new(engine: SyncEngine<SqliteDocumentStore>, local_timezone: &str) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(ExpenseTracker::new(engine))),
            local_timezone: local_timezone.to_owned(),
        }
    }
}

/// The state needed by the expense pages and endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    pub tracker: SharedTracker,
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            tracker: state.tracker.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
