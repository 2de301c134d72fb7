//! Tracks which expense, if any, is being edited.

use crate::{
    Error,
    expense::{Expense, RemoteId},
    store::DocumentStore,
    sync::{Ledger, SyncEngine},
    validation::{ExpenseForm, FormKind, ValidationService},
};

/// The edit session state machine.
///
/// At most one expense is edited at a time: opening a session closes any
/// session that is already open.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditSession {
    /// Nothing is being edited.
    #[default]
    Closed,
    /// The expense is being edited. This is a copy of the expense as it was
    /// when the session opened.
    Open(Expense),
}

impl EditSession {
    /// Start editing the expense `id`.
    ///
    /// Any open session is closed first.
    ///
    /// # Errors
    ///
    /// Returns [Error::ExpenseNotFound] if `id` is not in `ledger`, e.g. the
    /// expense was deleted after the list was rendered. The session is left
    /// closed.
    pub fn open(&mut self, id: &RemoteId, ledger: &Ledger) -> Result<&Expense, Error> {
        if let EditSession::Open(expense) = self {
            tracing::debug!("closing edit session for {}", expense.remote_id);
        }
        *self = EditSession::Closed;

        let expense = ledger.get(id).ok_or_else(|| {
            tracing::warn!("cannot edit expense {id}: it is not in the ledger");
            Error::ExpenseNotFound(id.clone())
        })?;

        *self = EditSession::Open(expense.clone());

        match self {
            EditSession::Open(expense) => Ok(expense),
            EditSession::Closed => Err(Error::NoEditSession),
        }
    }

    /// Submit the edit form for the open session.
    ///
    /// If the form is valid, the expense is overwritten in the store and the
    /// session closes whether or not the store accepted the write. If the form
    /// is invalid, the session stays open.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::NoEditSession] if no session is open,
    /// - [Error::InvalidExpense] if the form is invalid,
    /// - or the error from [SyncEngine::update].
    pub async fn submit<S: DocumentStore>(
        &mut self,
        form: &ExpenseForm,
        validation: &mut ValidationService,
        engine: &SyncEngine<S>,
    ) -> Result<RemoteId, Error> {
        let remote_id = match self {
            EditSession::Open(expense) => expense.remote_id.clone(),
            EditSession::Closed => return Err(Error::NoEditSession),
        };

        let input = validation.validate(FormKind::Edit, form)?;

        let result = engine.update(&remote_id, input).await;
        *self = EditSession::Closed;

        result.map(|_| remote_id)
    }

    /// Close the session without writing anything.
    pub fn cancel(&mut self) {
        *self = EditSession::Closed;
    }

    /// The expense being edited, if any.
    pub fn editing(&self) -> Option<&Expense> {
        match self {
            EditSession::Open(expense) => Some(expense),
            EditSession::Closed => None,
        }
    }

    /// Whether the session is editing `id`.
    pub fn is_editing(&self, id: &RemoteId) -> bool {
        self.editing()
            .is_some_and(|expense| &expense.remote_id == id)
    }
}
