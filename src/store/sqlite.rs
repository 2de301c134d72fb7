//! A [DocumentStore] backed by a SQLite database.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use tokio::sync::watch;
use uuid::Uuid;

use crate::expense::RemoteId;

use super::{
    DocumentStore, EXPENSES_COLLECTION, ExpenseDocument, Snapshot, SnapshotEvent, StoreError,
    StoredDocument, Subscription,
};

/// Stores expense documents as JSON in a SQLite table and publishes a fresh
/// snapshot to subscribers after every successful write.
///
/// Clones share the same connection and subscribers.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    connection: Arc<Mutex<Connection>>,
    snapshots: Arc<watch::Sender<SnapshotEvent>>,
}

type RowsAffected = usize;

impl SqliteDocumentStore {
    /// Create a store using `connection`, creating the document table if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created or the existing
    /// documents cannot be read.
    pub fn new(connection: Connection) -> Result<Self, StoreError> {
        create_document_table(&connection)?;
        let snapshot = read_snapshot(&connection)?;

        let (sender, _) = watch::channel(Ok(Arc::new(snapshot)));

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            snapshots: Arc::new(sender),
        })
    }

    /// Read the collection and send it to every subscriber.
    ///
    /// Called with the connection still locked so that snapshots are published
    /// in the same order as the writes that produced them.
    fn publish(&self, connection: &Connection) {
        let event = read_snapshot(connection).map(Arc::new);

        match &event {
            Ok(snapshot) => tracing::debug!(
                "publishing snapshot with {} documents",
                snapshot.documents.len()
            ),
            Err(error) => tracing::error!("could not read snapshot: {error}"),
        }

        let _ = self.snapshots.send_replace(event);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| StoreError::LockPoisoned)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn subscribe(&self) -> Result<Subscription, StoreError> {
        Ok(Subscription::new(self.snapshots.subscribe()))
    }

    async fn create(&self, fields: ExpenseDocument) -> Result<RemoteId, StoreError> {
        let id = RemoteId::new(Uuid::new_v4().to_string());
        let json = serde_json::to_string(&fields)?;

        let connection = self.lock()?;
        connection.execute(
            "INSERT INTO document (id, collection, fields) VALUES (?1, ?2, ?3)",
            (id.as_ref(), EXPENSES_COLLECTION, &json),
        )?;
        self.publish(&connection);

        Ok(id)
    }

    async fn update(&self, id: &RemoteId, fields: ExpenseDocument) -> Result<(), StoreError> {
        let json = serde_json::to_string(&fields)?;

        let connection = self.lock()?;
        let rows_affected: RowsAffected = connection.execute(
            "UPDATE document SET fields = ?1 WHERE id = ?2 AND collection = ?3",
            (&json, id.as_ref(), EXPENSES_COLLECTION),
        )?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }

        self.publish(&connection);

        Ok(())
    }

    async fn delete(&self, id: &RemoteId) -> Result<(), StoreError> {
        let connection = self.lock()?;
        let rows_affected: RowsAffected = connection.execute(
            "DELETE FROM document WHERE id = ?1 AND collection = ?2",
            (id.as_ref(), EXPENSES_COLLECTION),
        )?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }

        self.publish(&connection);

        Ok(())
    }
}

/// Create the document table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_document_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS document (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                collection TEXT NOT NULL,
                fields TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_document_collection ON document(collection, seq);",
        (),
    )?;

    Ok(())
}

/// Read every expense document in insertion order.
///
/// A document whose fields cannot be decoded is logged and left out so that
/// one bad document does not hide the rest of the collection.
fn read_snapshot(connection: &Connection) -> Result<Snapshot, StoreError> {
    let rows: Vec<(String, String)> = connection
        .prepare("SELECT id, fields FROM document WHERE collection = ?1 ORDER BY seq")?
        .query_map([EXPENSES_COLLECTION], map_document_row)?
        .collect::<Result<_, _>>()?;

    let documents = rows
        .into_iter()
        .filter_map(|(id, fields)| match serde_json::from_str(&fields) {
            Ok(fields) => Some(StoredDocument {
                id: RemoteId::new(id),
                fields,
            }),
            Err(error) => {
                tracing::warn!("skipping document {id} with undecodable fields: {error}");
                None
            }
        })
        .collect();

    Ok(Snapshot { documents })
}

fn map_document_row(row: &Row) -> Result<(String, String), rusqlite::Error> {
    let id = row.get(0)?;
    let fields = row.get(1)?;

    Ok((id, fields))
}
