//! Keeps the in-memory ledger synchronized with the document store.
//!
//! The [SyncEngine] subscribes to the store and rebuilds the [Ledger] from
//! every snapshot it receives. Writes go straight to the store and are never
//! applied locally: a new or edited expense only shows up in the ledger once
//! the store delivers a snapshot containing it, so a write can never be
//! applied twice and a failed write never needs to be rolled back.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    Error,
    expense::{Expense, ExpenseInput, ExpenseName, LocalId, LocalIdGenerator, RemoteId},
    store::{
        DocumentStore, ExpenseDocument, Snapshot, StoreError, StoredDocument, date_to_timestamp,
        timestamp_to_date,
    },
    validation::FieldValidity,
};

/// Settings for talking to the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// How long to wait for the store to accept a write, and for the
    /// snapshot reflecting a write in [SyncEngine::wait_until].
    pub write_timeout: Duration,
    /// How long to wait before subscribing again after the subscription was
    /// disconnected. `None` leaves the ledger stale until the app restarts.
    pub resubscribe_delay: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(10),
            resubscribe_delay: Some(Duration::from_secs(5)),
        }
    }
}

/// The health of the subscription behind the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SyncStatus {
    /// No snapshot has been received yet.
    Connecting,
    /// The ledger reflects the latest snapshot.
    Live,
    /// The subscription failed, so the ledger may be out of date.
    Stale {
        /// Why the subscription failed.
        reason: String,
    },
}

/// The in-memory copy of the expense collection.
///
/// A ledger is immutable: every snapshot produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    expenses: Vec<Expense>,
    status: SyncStatus,
    revision: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            expenses: Vec::new(),
            status: SyncStatus::Connecting,
            revision: 0,
        }
    }
}

impl Ledger {
    /// Build a ledger from every document in `snapshot`, keeping snapshot order.
    ///
    /// Documents that do not describe a valid expense are skipped.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let expenses = snapshot
            .documents
            .iter()
            .filter_map(|document| {
                map_document(document)
                    .inspect_err(|error| {
                        tracing::warn!("skipping document {}: {error}", document.id)
                    })
                    .ok()
            })
            .collect();

        Self {
            expenses,
            status: SyncStatus::Live,
            revision: 0,
        }
    }

    /// The expenses in snapshot order.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Find the expense with the store identifier `id`.
    pub fn get(&self, id: &RemoteId) -> Option<&Expense> {
        self.expenses.iter().find(|expense| &expense.remote_id == id)
    }

    /// Whether the expense `id` is in the ledger.
    pub fn contains(&self, id: &RemoteId) -> bool {
        self.get(id).is_some()
    }

    /// The number of expenses.
    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    /// Whether the ledger has no expenses.
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// The sum of every expense amount.
    pub fn total(&self) -> f64 {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }

    /// The health of the subscription.
    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    /// How many ledgers have been published before this one.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

fn map_document(document: &StoredDocument) -> Result<Expense, Error> {
    let fields = &document.fields;

    if !fields.amount.is_finite() {
        return Err(Error::InvalidExpense(FieldValidity {
            amount: false,
            ..FieldValidity::VALID
        }));
    }

    Ok(Expense {
        remote_id: document.id.clone(),
        local_id: LocalId::new(fields.local_id),
        name: ExpenseName::new(&fields.name)?,
        amount: fields.amount,
        date: fields.date.map(timestamp_to_date),
    })
}

/// The store cannot hold NaN or infinite amounts, and a document written with
/// one could not be read back.
fn check_amount(input: &ExpenseInput) -> Result<(), Error> {
    if input.amount.is_finite() {
        return Ok(());
    }

    tracing::warn!("refusing to write an expense with amount {}", input.amount);
    Err(Error::InvalidExpense(FieldValidity {
        amount: false,
        ..FieldValidity::VALID
    }))
}

fn to_document(input: ExpenseInput, local_id: LocalId) -> ExpenseDocument {
    ExpenseDocument {
        name: input.name.to_string(),
        amount: input.amount,
        date: input.date.map(date_to_timestamp),
        local_id: local_id.get(),
    }
}

/// Mediates between the in-memory [Ledger] and the document store.
///
/// Clones share the same ledger and store.
#[derive(Debug, Clone)]
pub struct SyncEngine<S> {
    store: S,
    ledger: Arc<watch::Sender<Arc<Ledger>>>,
    local_ids: Arc<LocalIdGenerator>,
    config: SyncConfig,
}

impl<S: DocumentStore> SyncEngine<S> {
    /// Create an engine with an empty ledger. Call [SyncEngine::subscribe]
    /// to start receiving snapshots.
    pub fn new(store: S, config: SyncConfig) -> Self {
        let (sender, _) = watch::channel(Arc::new(Ledger::default()));

        Self {
            store,
            ledger: Arc::new(sender),
            local_ids: Arc::new(LocalIdGenerator::new()),
            config,
        }
    }

    /// Start the standing subscription to the store.
    ///
    /// Every snapshot rebuilds the ledger. The subscription runs until the
    /// returned task is aborted.
    pub fn subscribe(&self) -> JoinHandle<()> {
        let engine = self.clone();

        tokio::spawn(async move { engine.run_subscription().await })
    }

    async fn run_subscription(self) {
        loop {
            match self.store.subscribe() {
                Ok(mut subscription) => loop {
                    match subscription.next().await {
                        Ok(snapshot) => self.apply_snapshot(&snapshot),
                        Err(StoreError::Disconnected) => {
                            self.mark_stale(&StoreError::Disconnected);
                            break;
                        }
                        Err(error) => self.mark_stale(&error),
                    }
                },
                Err(error) => self.mark_stale(&error),
            }

            match self.config.resubscribe_delay {
                Some(delay) => {
                    tracing::info!("subscribing again in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                None => return,
            }
        }
    }

    /// Replace the ledger with the contents of `snapshot`.
    pub fn apply_snapshot(&self, snapshot: &Snapshot) {
        let mut ledger = Ledger::from_snapshot(snapshot);

        self.ledger.send_modify(|current| {
            ledger.revision = current.revision + 1;
            tracing::debug!(
                "applied snapshot {} with {} expenses",
                ledger.revision,
                ledger.len()
            );
            *current = Arc::new(ledger);
        });
    }

    fn mark_stale(&self, error: &StoreError) {
        tracing::error!("{}", Error::Subscription(error.clone()));

        self.ledger.send_modify(|current| {
            *current = Arc::new(Ledger {
                expenses: current.expenses.clone(),
                status: SyncStatus::Stale {
                    reason: error.to_string(),
                },
                revision: current.revision + 1,
            });
        });
    }

    /// The current ledger.
    pub fn ledger(&self) -> Arc<Ledger> {
        self.ledger.borrow().clone()
    }

    /// A receiver that is notified whenever a new ledger is published.
    pub fn watch(&self) -> watch::Receiver<Arc<Ledger>> {
        self.ledger.subscribe()
    }

    /// Wait until a published ledger satisfies `predicate`, e.g. until a newly
    /// created expense arrives in a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [Error::SnapshotTimeout] if no such ledger is published within
    /// the write timeout.
    pub async fn wait_until(
        &self,
        predicate: impl FnMut(&Arc<Ledger>) -> bool,
    ) -> Result<Arc<Ledger>, Error> {
        let mut receiver = self.watch();

        match tokio::time::timeout(self.config.write_timeout, receiver.wait_for(predicate)).await
        {
            Ok(Ok(ledger)) => Ok(ledger.clone()),
            // The sender lives as long as `self`, so the channel cannot close here.
            Ok(Err(_)) | Err(_) => Err(Error::SnapshotTimeout),
        }
    }

    /// Write a new expense to the store.
    ///
    /// The ledger is not changed: the expense appears once the store delivers
    /// a snapshot containing it.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidExpense] without writing if the amount is not
    /// finite, [Error::StoreWrite] if the store rejects the write, or
    /// [Error::StoreTimeout] if the store does not respond in time.
    pub async fn create(&self, input: ExpenseInput) -> Result<RemoteId, Error> {
        check_amount(&input)?;
        let document = to_document(input, self.local_ids.next_id());

        let id = self
            .with_timeout("create", self.store.create(document))
            .await?;
        tracing::info!("created expense {id}");

        Ok(id)
    }

    /// Overwrite every field of the expense `id` in the store.
    ///
    /// The expense keeps its local ID. Concurrent edits are not merged: the
    /// last write wins.
    ///
    /// # Errors
    ///
    /// Returns [Error::ExpenseNotFound] without writing if `id` is not in the
    /// current ledger, and the errors of [SyncEngine::create] otherwise.
    pub async fn update(&self, id: &RemoteId, input: ExpenseInput) -> Result<(), Error> {
        check_amount(&input)?;
        let local_id = match self.ledger().get(id) {
            Some(expense) => expense.local_id,
            None => {
                tracing::warn!("tried to update expense {id}, which is not in the ledger");
                return Err(Error::ExpenseNotFound(id.clone()));
            }
        };

        self.with_timeout("update", self.store.update(id, to_document(input, local_id)))
            .await?;
        tracing::info!("updated expense {id}");

        Ok(())
    }

    /// Delete the expense `id` from the store.
    ///
    /// Callers are responsible for getting the user's confirmation first.
    ///
    /// # Errors
    ///
    /// Returns [Error::ExpenseNotFound] without writing if `id` is not in the
    /// current ledger, and the errors of [SyncEngine::create] otherwise.
    pub async fn delete(&self, id: &RemoteId) -> Result<(), Error> {
        if !self.ledger().contains(id) {
            tracing::warn!("tried to delete expense {id}, which is not in the ledger");
            return Err(Error::ExpenseNotFound(id.clone()));
        }

        self.with_timeout("delete", self.store.delete(id)).await?;
        tracing::info!("deleted expense {id}");

        Ok(())
    }

    async fn with_timeout<T>(
        &self,
        operation: &str,
        write: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, Error> {
        match tokio::time::timeout(self.config.write_timeout, write).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                tracing::error!("could not {operation} expense: {error}");
                Err(Error::StoreWrite(error))
            }
            Err(_) => {
                tracing::error!(
                    "could not {operation} expense: no response after {:?}",
                    self.config.write_timeout
                );
                Err(Error::StoreTimeout)
            }
        }
    }
}
