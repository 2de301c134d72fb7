//! The expense tracker: the one object that owns the user-facing state.

use std::sync::Arc;

use time::Date;

use crate::{
    Error,
    edit_session::EditSession,
    expense::{Expense, RemoteId},
    projection::{ActionKind, Projection, RecordAction, SortSpec, project},
    store::DocumentStore,
    sync::{Ledger, SyncEngine},
    validation::{ExpenseForm, FormKind, ValidationService},
};

/// What happened when a [RecordAction] was dispatched.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The edit session is now open for this expense.
    EditOpened(Expense),
    /// The store accepted the deletion of this expense.
    Deleted(RemoteId),
}

/// Owns the sync engine handle, the form validation state and the edit session.
///
/// Every user action goes through this type. The ledger itself is owned by
/// the engine and only changes when the store delivers a snapshot.
#[derive(Debug)]
pub struct ExpenseTracker<S> {
    engine: SyncEngine<S>,
    validation: ValidationService,
    session: EditSession,
}

impl<S: DocumentStore> ExpenseTracker<S> {
    /// Create a tracker with pristine forms and no edit session.
    pub fn new(engine: SyncEngine<S>) -> Self {
        Self {
            engine,
            validation: ValidationService::new(),
            session: EditSession::Closed,
        }
    }

    /// Validate the add form and write a new expense to the store.
    ///
    /// On success the add form returns to its pristine state. The new expense
    /// is not in the ledger until the store delivers the next snapshot.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidExpense] without writing if the form is invalid,
    /// or the error from [SyncEngine::create].
    pub async fn add(&mut self, form: &ExpenseForm) -> Result<RemoteId, Error> {
        let input = self.validation.validate(FormKind::Add, form)?;
        let id = self.engine.create(input).await?;
        self.validation.reset(FormKind::Add);

        Ok(id)
    }

    /// Open the edit session for `id` with a pristine edit form.
    ///
    /// # Errors
    ///
    /// Returns [Error::ExpenseNotFound] if `id` is not in the current ledger.
    pub fn open_edit(&mut self, id: &RemoteId) -> Result<&Expense, Error> {
        let ledger = self.engine.ledger();
        self.validation.reset(FormKind::Edit);

        self.session.open(id, &ledger)
    }

    /// Submit the edit form, see [EditSession::submit].
    pub async fn submit_edit(&mut self, form: &ExpenseForm) -> Result<RemoteId, Error> {
        let result = self
            .session
            .submit(form, &mut self.validation, &self.engine)
            .await;

        if self.session.editing().is_none() {
            self.validation.reset(FormKind::Edit);
        }

        result
    }

    /// Close the edit session without writing anything.
    pub fn cancel_edit(&mut self) {
        self.session.cancel();
        self.validation.reset(FormKind::Edit);
    }

    /// Delete the expense `id`. The caller must have the user's confirmation.
    ///
    /// Deleting the expense that is being edited also closes the edit session.
    ///
    /// # Errors
    ///
    /// Returns the error from [SyncEngine::delete].
    pub async fn delete(&mut self, id: &RemoteId) -> Result<(), Error> {
        self.engine.delete(id).await?;

        if self.session.is_editing(id) {
            self.cancel_edit();
        }

        Ok(())
    }

    /// Perform the action a user chose from a row of the expense list.
    pub async fn dispatch(&mut self, action: RecordAction) -> Result<ActionOutcome, Error> {
        match action.kind {
            ActionKind::Edit => self
                .open_edit(&action.remote_id)
                .map(|expense| ActionOutcome::EditOpened(expense.clone())),
            ActionKind::Delete => {
                self.delete(&action.remote_id).await?;
                Ok(ActionOutcome::Deleted(action.remote_id))
            }
        }
    }

    /// The expense list ordered by `sort`, with dates labelled relative to `today`.
    pub fn view(&self, sort: SortSpec, today: Date) -> Projection {
        project(self.engine.ledger().expenses(), sort, today)
    }

    /// The current ledger.
    pub fn ledger(&self) -> Arc<Ledger> {
        self.engine.ledger()
    }

    /// The validation state of the add and edit forms.
    pub fn forms(&self) -> &ValidationService {
        &self.validation
    }

    /// The edit session.
    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// The engine, e.g. for waiting on a snapshot after a write.
    pub fn engine(&self) -> &SyncEngine<S> {
        &self.engine
    }
}
