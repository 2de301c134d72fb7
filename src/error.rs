//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, expense::RemoteId, internal_server_error::InternalServerError,
    not_found::NotFoundError, store::StoreError, validation::FieldValidity,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string, or only whitespace, was used as an expense name.
    #[error("expense name cannot be empty")]
    EmptyExpenseName,

    /// One or more fields of a submitted form failed validation.
    ///
    /// Nothing was written to the store.
    #[error("{0}")]
    InvalidExpense(FieldValidity),

    /// The expense is not in the ledger, e.g. because another client deleted
    /// it after the list was rendered.
    #[error("expense {0} does not exist")]
    ExpenseNotFound(RemoteId),

    /// The edit form was submitted while no expense was being edited.
    #[error("no expense is being edited")]
    NoEditSession,

    /// The document store rejected a write.
    ///
    /// The ledger is left as it was.
    #[error("could not save the change: {0}")]
    StoreWrite(StoreError),

    /// The document store did not respond to a write in time.
    #[error("the document store did not respond in time")]
    StoreTimeout,

    /// The subscription to the expense collection failed.
    #[error("the expense subscription failed: {0}")]
    Subscription(StoreError),

    /// A write succeeded but the snapshot containing it did not arrive in time.
    #[error("the change was saved but has not been received yet")]
    SnapshotTimeout,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::ExpenseNotFound(_) => NotFoundError.into_response(),
            Error::InvalidTimezone(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// The HTTP status code for an alert about this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::ExpenseNotFound(_) | Error::NoEditSession => StatusCode::NOT_FOUND,
            Error::EmptyExpenseName | Error::InvalidExpense(_) => StatusCode::BAD_REQUEST,
            Error::StoreWrite(_) | Error::Subscription(_) => StatusCode::BAD_GATEWAY,
            Error::StoreTimeout | Error::SnapshotTimeout => StatusCode::SERVICE_UNAVAILABLE,
            Error::InvalidTimezone(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let status_code = self.status_code();

        let alert = match self {
            Error::EmptyExpenseName => Alert::ErrorSimple {
                message: "Expense name cannot be empty".to_owned(),
            },
            Error::InvalidExpense(validity) => Alert::Error {
                message: "Invalid expense".to_owned(),
                details: format!("Check the highlighted fields: {validity}."),
            },
            Error::ExpenseNotFound(_) => Alert::Error {
                message: "Expense not found".to_owned(),
                details: "The expense could not be found. \
                    It may have been deleted on another device."
                    .to_owned(),
            },
            Error::NoEditSession => Alert::Error {
                message: "Nothing to save".to_owned(),
                details: "No expense is being edited. Choose an expense to edit from the list."
                    .to_owned(),
            },
            Error::StoreWrite(error) => Alert::Error {
                message: "Could not save the change".to_owned(),
                details: format!("The expense list has not been changed. {error}"),
            },
            Error::StoreTimeout => Alert::Error {
                message: "Could not save the change".to_owned(),
                details: "The document store did not respond in time. Try again later.".to_owned(),
            },
            Error::Subscription(error) => Alert::Error {
                message: "Expenses may be out of date".to_owned(),
                details: error.to_string(),
            },
            Error::SnapshotTimeout => Alert::Success {
                message: "Change saved".to_owned(),
                details: "It will appear in the list once the document store sends it.".to_owned(),
            },
            Error::InvalidTimezone(timezone) => Alert::Error {
                message: "Invalid Timezone Settings".to_owned(),
                details: format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            },
        };

        (status_code, alert).into_response()
    }
}
