//! A client for a shared expense ledger kept in a document store.
//!
//! The [SyncEngine] keeps an in-memory copy of the expense collection in step
//! with the store, and the web app built by [build_router] lets users add,
//! edit, delete and sort expenses. Every change is written to the store and
//! shows up in the list once the store sends it back in a snapshot, so
//! several clients sharing one store all see the same expenses.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod currency;
mod edit_session;
mod endpoints;
mod error;
mod expense;
mod html;
mod internal_server_error;
mod not_found;
mod projection;
mod routing;
mod store;
mod sync;
mod timezone;
mod tracker;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use edit_session::EditSession;
pub use error::Error;
pub use expense::{Expense, ExpenseInput, ExpenseName, LocalId, RemoteId};
pub use projection::{ExpenseRow, Projection, SortDirection, SortField, SortSpec, project};
pub use routing::build_router;
pub use store::{DocumentStore, SqliteDocumentStore, StoreError};
pub use sync::{Ledger, SyncConfig, SyncEngine, SyncStatus};
pub use timezone::local_today;
pub use tracker::ExpenseTracker;
pub use validation::{ExpenseForm, FormKind, ValidationService};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
