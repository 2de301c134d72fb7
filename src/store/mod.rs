//! The document store that holds the authoritative expense records.
//!
//! The store is modelled on a real-time document database: clients subscribe
//! to a collection and receive the complete set of documents whenever any of
//! them changes, and write documents by identifier.

mod sqlite;

use std::{future::Future, sync::Arc};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};
use tokio::sync::watch;

use crate::expense::RemoteId;

pub use sqlite::SqliteDocumentStore;

/// The name of the collection that holds expense documents.
pub const EXPENSES_COLLECTION: &str = "expenses";

/// Errors originating from the document store.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    /// The document does not exist, e.g. it was deleted by another client.
    #[error("document {0} does not exist")]
    NotFound(RemoteId),

    /// An unhandled error from the underlying database.
    #[error("an unexpected SQL error occurred: {0}")]
    Sql(String),

    /// A document's fields could not be encoded or decoded.
    #[error("could not (de)serialize document fields: {0}")]
    Serialization(String),

    /// Another thread panicked while holding the database lock.
    #[error("could not acquire the database lock")]
    LockPoisoned,

    /// The store stopped delivering snapshots.
    #[error("the subscription was disconnected")]
    Disconnected,
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        StoreError::Sql(value.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Serialization(value.to_string())
    }
}

/// The fields of an expense document as the store holds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDocument {
    /// What the money was spent on.
    pub name: String,
    /// The amount of money spent.
    pub amount: f64,
    /// The store-native timestamp for the expense date, see [date_to_timestamp].
    #[serde(with = "time::serde::timestamp::option")]
    pub date: Option<OffsetDateTime>,
    /// The identifier assigned by the client that created the expense.
    pub local_id: i64,
}

/// A document and the identifier the store assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// The store's identifier for the document.
    pub id: RemoteId,
    /// The document's fields.
    pub fields: ExpenseDocument,
}

/// The complete contents of a collection at one point in time.
///
/// Documents are in the order they were created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Every document in the collection.
    pub documents: Vec<StoredDocument>,
}

/// What a store publishes to its subscribers: the latest snapshot, or the
/// error that prevented it from reading one.
pub type SnapshotEvent = Result<Arc<Snapshot>, StoreError>;

/// A standing subscription to a collection.
///
/// The first call to [Subscription::next] yields the current snapshot. Later
/// calls wait for the next change. Snapshots published while the subscriber
/// was busy are coalesced into the latest one, which is always complete.
#[derive(Debug)]
pub struct Subscription {
    receiver: watch::Receiver<SnapshotEvent>,
    delivered_initial: bool,
}

impl Subscription {
    /// Subscribe to the snapshots published through `receiver`.
    pub fn new(receiver: watch::Receiver<SnapshotEvent>) -> Self {
        Self {
            receiver,
            delivered_initial: false,
        }
    }

    /// Wait for the next snapshot.
    ///
    /// # Errors
    ///
    /// Returns the error the store published instead of a snapshot, or
    /// [StoreError::Disconnected] once the store stops publishing.
    pub async fn next(&mut self) -> SnapshotEvent {
        if self.delivered_initial {
            self.receiver
                .changed()
                .await
                .map_err(|_| StoreError::Disconnected)?;
        }

        self.delivered_initial = true;

        self.receiver.borrow_and_update().clone()
    }
}

/// A real-time document store holding expense documents.
///
/// Writes resolve once the store has accepted them; subscribers see the change
/// in a later snapshot.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    /// Subscribe to the expense collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot start a subscription.
    fn subscribe(&self) -> Result<Subscription, StoreError>;

    /// Create a document and return the identifier the store assigned to it.
    fn create(
        &self,
        fields: ExpenseDocument,
    ) -> impl Future<Output = Result<RemoteId, StoreError>> + Send;

    /// Overwrite every field of the document `id`.
    ///
    /// # Errors
    ///
    /// Returns [StoreError::NotFound] if the document does not exist.
    fn update(
        &self,
        id: &RemoteId,
        fields: ExpenseDocument,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete the document `id`.
    ///
    /// # Errors
    ///
    /// Returns [StoreError::NotFound] if the document does not exist.
    fn delete(&self, id: &RemoteId) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Convert a calendar date to the store's timestamp type: midnight UTC.
pub fn date_to_timestamp(date: Date) -> OffsetDateTime {
    date.with_time(Time::MIDNIGHT).assume_utc()
}

/// Convert a store timestamp back to the calendar date it was written for.
pub fn timestamp_to_date(timestamp: OffsetDateTime) -> Date {
    timestamp.to_offset(time::UtcOffset::UTC).date()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::{date, datetime};
    use tokio::sync::watch;

    use super::{
        Snapshot, SnapshotEvent, StoreError, Subscription, date_to_timestamp, timestamp_to_date,
    };

    #[test]
    fn dates_round_trip_through_timestamps() {
        let date = date!(2026 - 10 - 19);

        let timestamp = date_to_timestamp(date);

        assert_eq!(timestamp, datetime!(2026-10-19 0:00 UTC));
        assert_eq!(timestamp_to_date(timestamp), date);
    }

    #[test]
    fn timestamp_with_offset_uses_utc_date() {
        let timestamp = datetime!(2026-10-20 1:00 +12:00);

        assert_eq!(timestamp_to_date(timestamp), date!(2026 - 10 - 19));
    }

    #[tokio::test]
    async fn subscription_yields_current_snapshot_first() {
        let (sender, receiver) = watch::channel::<SnapshotEvent>(Ok(Arc::new(Snapshot::default())));
        let mut subscription = Subscription::new(receiver);

        let first = subscription.next().await.expect("initial snapshot");
        assert!(first.documents.is_empty());

        drop(sender);
        assert_eq!(subscription.next().await, Err(StoreError::Disconnected));
    }
}
