//! The expense editing page and the endpoints that end the edit session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    app_state::ExpenseState,
    endpoints::{self, format_endpoint},
    expense::{
        Expense, RemoteId,
        form::{ExpenseFormView, FormMethod},
    },
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base, dollar_input_styles},
    projection::RecordAction,
    tracker::ActionOutcome,
    validation::{ExpenseForm, FormKind, FormState},
};

/// Open the edit session for an expense and render the edit page.
///
/// Renders the 404 page if the expense is not in the ledger.
pub async fn get_edit_expense_page(
    State(state): State<ExpenseState>,
    Path(remote_id): Path<RemoteId>,
) -> Result<Response, Error> {
    let mut tracker = state.tracker.lock().await;

    let expense = match tracker.dispatch(RecordAction::edit(remote_id)).await? {
        ActionOutcome::EditOpened(expense) => expense,
        ActionOutcome::Deleted(id) => return Err(Error::ExpenseNotFound(id)),
    };

    Ok(edit_expense_view(
        &expense.remote_id,
        &form_values(&expense),
        tracker.forms().form(FormKind::Edit),
    )
    .into_response())
}

/// Save the edit form for the expense in the edit session.
///
/// Redirects to the ledger page once the change has arrived in a snapshot.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseState>,
    Path(remote_id): Path<RemoteId>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let mut tracker = state.tracker.lock().await;

    if !tracker.session().is_editing(&remote_id) {
        tracing::warn!("received edit for {remote_id}, which is not being edited");
        return Error::NoEditSession.into_alert_response();
    }

    let engine = tracker.engine().clone();
    let revision = engine.ledger().revision();
    let result = tracker.submit_edit(&form).await;

    match result {
        Ok(_) => {
            drop(tracker);

            match engine
                .wait_until(|ledger| ledger.revision() > revision)
                .await
            {
                Ok(_) => (
                    HxRedirect(endpoints::ROOT.to_owned()),
                    StatusCode::SEE_OTHER,
                )
                    .into_response(),
                Err(error) => error.into_alert_response(),
            }
        }
        Err(Error::InvalidExpense(validity)) => {
            tracing::debug!("rejected edit for {remote_id}: {validity}");
            edit_expense_form_view(&remote_id, &form, tracker.forms().form(FormKind::Edit))
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

/// Close the edit session without saving and go back to the ledger page.
pub async fn cancel_edit_endpoint(State(state): State<ExpenseState>) -> Response {
    state.tracker.lock().await.cancel_edit();

    (
        HxRedirect(endpoints::ROOT.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// The edit form pre-filled with `expense`.
fn form_values(expense: &Expense) -> ExpenseForm {
    ExpenseForm {
        name: expense.name.to_string(),
        amount: expense.amount.to_string(),
        date: expense
            .date
            .map(|date| date.to_string())
            .unwrap_or_default(),
    }
}

fn edit_expense_view(remote_id: &RemoteId, values: &ExpenseForm, state: &FormState) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            header class="w-full flex justify-between items-end mb-4"
            {
                h1 class="text-xl font-bold" { "Edit Expense" }
                a href=(endpoints::ROOT) class=(LINK_STYLE) { "Back to expenses" }
            }

            (edit_expense_form_view(remote_id, values, state))
        }
    };

    base("Edit Expense", &[dollar_input_styles()], &content)
}

fn edit_expense_form_view(remote_id: &RemoteId, values: &ExpenseForm, state: &FormState) -> Markup {
    ExpenseFormView {
        id: "edit-expense-form",
        endpoint: &format_endpoint(endpoints::EXPENSE, remote_id.as_ref()),
        method: FormMethod::Put,
        values,
        state,
        submit_label: "Save Changes",
        cancel_endpoint: Some(endpoints::CANCEL_EDIT),
    }
    .into_html()
}
