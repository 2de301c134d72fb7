//! Defines the core data model for expenses and their identifiers.

use std::{
    fmt::Display,
    str::FromStr,
    sync::atomic::{AtomicI64, Ordering},
};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::Error;

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// The identifier the document store assigns to an expense when it is created.
///
/// This is the only key used for updating and deleting expenses in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    /// Wrap an identifier issued by a document store.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for RemoteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A millisecond timestamp assigned by the client that created the expense.
///
/// Only used to correlate list rows in the UI, never as a store key: two
/// clients creating expenses in the same millisecond may produce the same
/// local ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(i64);

impl LocalId {
    /// Wrap a raw local ID, e.g. one read back from the store.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw millisecond timestamp.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for LocalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out strictly increasing [LocalId]s based on the current time.
///
/// If two IDs are requested within the same millisecond, the second one is
/// bumped by one so that IDs issued by this generator never repeat.
#[derive(Debug, Default)]
pub struct LocalIdGenerator {
    last: AtomicI64,
}

impl LocalIdGenerator {
    /// Create a generator that has not issued any IDs yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the next local ID.
    pub fn next_id(&self) -> LocalId {
        let now = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;

        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            // The closure always returns `Some`, so both arms carry the previous value.
            .unwrap_or_else(|last| last);

        LocalId(now.max(previous + 1))
    }
}

// ============================================================================
// MODELS
// ============================================================================

/// A validated, non-empty expense name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct ExpenseName(String);

impl ExpenseName {
    /// Create an expense name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyExpenseName] if `name` is empty
    /// or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyExpenseName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }
}

impl AsRef<str> for ExpenseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ExpenseName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpenseName::new(s)
    }
}

impl Display for ExpenseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An expense as held in the in-memory ledger.
///
/// Expenses are only ever created from store snapshots, so every expense has
/// a [RemoteId] that exists in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    /// The store's identifier for the expense.
    pub remote_id: RemoteId,
    /// The identifier assigned by the client that created the expense.
    pub local_id: LocalId,
    /// What the money was spent on.
    pub name: ExpenseName,
    /// The amount of money spent. Negative amounts are refunds or income.
    pub amount: f64,
    /// The day the money was spent, if known.
    pub date: Option<Date>,
}

/// The validated field values for creating or overwriting an expense.
///
/// Use [crate::validation::ValidationService] to get one from raw form input.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseInput {
    /// What the money was spent on.
    pub name: ExpenseName,
    /// A finite amount of money.
    pub amount: f64,
    /// The day the money was spent, if known.
    pub date: Option<Date>,
}
