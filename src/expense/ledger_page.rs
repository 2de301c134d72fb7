//! The ledger page: the sync status, running total, expense list and add form.

use std::borrow::Cow;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error,
    app_state::ExpenseState,
    endpoints::{self, format_endpoint},
    expense::form::{ExpenseFormView, FormMethod},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles,
    },
    projection::{ActionKind, ExpenseRow, Projection, SortDirection, SortField, SortSpec},
    sync::SyncStatus,
    timezone::local_today,
    validation::{ExpenseForm, FormState},
};

/// Names longer than this many characters are cut short in the list.
const MAX_NAME_LENGTH: usize = 40;

/// How often the list asks the server for the latest ledger.
const POLL_INTERVAL: &str = "every 2s";

/// Renders the ledger page.
///
/// The add form is always rendered untouched. Its validation errors are only
/// shown in the fragment returned to the visitor who submitted it.
pub async fn get_ledger_page(
    State(state): State<ExpenseState>,
    Query(sort): Query<SortSpec>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let tracker = state.tracker.lock().await;
    let projection = tracker.view(sort, today);
    let ledger = tracker.ledger();

    Ok(ledger_view(&projection, ledger.status(), sort).into_response())
}

/// Renders just the expense list, for polling.
pub async fn get_expense_list(
    State(state): State<ExpenseState>,
    Query(sort): Query<SortSpec>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let tracker = state.tracker.lock().await;
    let projection = tracker.view(sort, today);

    Ok(expense_list_view(&projection, tracker.ledger().status(), sort).into_response())
}

pub(super) fn add_expense_form_view(values: &ExpenseForm, state: &FormState) -> Markup {
    ExpenseFormView {
        id: "add-expense-form",
        endpoint: endpoints::EXPENSES_API,
        method: FormMethod::Post,
        values,
        state,
        submit_label: "Add Expense",
        cancel_endpoint: None,
    }
    .into_html()
}

fn ledger_view(projection: &Projection, status: &SyncStatus, sort: SortSpec) -> Markup {
    let content = html!(
        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl grid gap-8 lg:grid-cols-3"
            {
                section class="lg:col-span-2 space-y-4"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    (expense_list_view(projection, status, sort))
                }

                section class="space-y-4"
                {
                    h2 class="text-lg font-semibold" { "Add Expense" }

                    (add_expense_form_view(&ExpenseForm::default(), &FormState::default()))
                }
            }
        }
    );

    base("Expenses", &[dollar_input_styles()], &content)
}

fn expense_list_view(projection: &Projection, status: &SyncStatus, sort: SortSpec) -> Markup {
    let list_url = format!("{}?{}", endpoints::EXPENSE_LIST_VIEW, sort_query(sort));

    html!(
        div
            id="expense-list"
            hx-get=(list_url)
            hx-trigger=(POLL_INTERVAL)
            hx-swap="outerHTML"
            class="space-y-4"
        {
            (sync_status_view(status))

            p class="text-lg"
            {
                "Total: "
                span
                    id="expense-total"
                    class={ "font-semibold tabular-nums " (projection.total_sign.text_class()) }
                {
                    (projection.total_text)
                }
            }

            div class="w-full overflow-x-auto dark:bg-gray-800"
            {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            (sort_header(sort, SortField::Name, "Name", ""))
                            (sort_header(sort, SortField::Amount, "Amount", "text-right"))
                            (sort_header(sort, SortField::Date, "Date", ""))
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for row in &projection.rows {
                            (expense_row_view(row))
                        }

                        @if projection.rows.is_empty() {
                            tr
                            {
                                td
                                    colspan="4"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No expenses yet. Add one with the form."
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn sync_status_view(status: &SyncStatus) -> Markup {
    match status {
        SyncStatus::Live => html!(),
        SyncStatus::Connecting => html!(
            div
                role="status"
                class="p-4 text-sm text-blue-800 rounded-lg bg-blue-50 dark:bg-gray-800 dark:text-blue-400"
            {
                "Loading expenses..."
            }
        ),
        SyncStatus::Stale { reason } => html!(
            div
                role="status"
                id="stale-banner"
                class="p-4 text-sm text-yellow-800 rounded-lg bg-yellow-50 dark:bg-gray-800 dark:text-yellow-300"
            {
                "Expenses may be out of date: " (reason)
            }
        ),
    }
}

fn expense_row_view(row: &ExpenseRow) -> Markup {
    html!(
        tr
            id={ "expense-" (row.local_id) }
            data-remote-id=(row.remote_id)
            class=(TABLE_ROW_STYLE)
        {
            th
                scope="row"
                title=(row.name)
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (truncate_name(&row.name, MAX_NAME_LENGTH))
            }

            td class={ "px-6 py-4 text-right tabular-nums " (row.amount_sign.text_class()) }
            {
                (row.amount_text)
            }

            td class=(TABLE_CELL_STYLE)
            {
                @if let (Some(date), Some(date_text)) = (row.date, &row.date_text) {
                    time datetime=(date) { (date_text) }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    @for action in &row.actions {
                        @match action.kind {
                            ActionKind::Edit => {
                                a
                                    href=(format_endpoint(endpoints::EDIT_EXPENSE_VIEW, action.remote_id.as_ref()))
                                    class=(LINK_STYLE)
                                {
                                    "Edit"
                                }
                            }
                            ActionKind::Delete => {
                                button
                                    type="button"
                                    hx-delete=(format_endpoint(endpoints::EXPENSE, action.remote_id.as_ref()))
                                    hx-confirm=(format!(
                                        "Are you sure you want to delete '{}'? This cannot be undone.",
                                        row.name
                                    ))
                                    hx-target-error="#alert-container"
                                    class=(BUTTON_DELETE_STYLE)
                                {
                                    "Delete"
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn sort_header(current: SortSpec, field: SortField, label: &str, align: &str) -> Markup {
    let indicator = match (current.sort == field, current.order) {
        (false, _) => "",
        (true, SortDirection::Ascending) => " ▲",
        (true, SortDirection::Descending) => " ▼",
    };

    html!(
        th scope="col" class={ "px-6 py-3 " (align) }
        {
            a href=(sort_url(current, field)) class="hover:underline"
            {
                (label) (indicator)
            }
        }
    )
}

/// The link for sorting by `field`: toggles the direction if the list is
/// already sorted by `field`.
fn sort_url(current: SortSpec, field: SortField) -> String {
    let order = if current.sort == field {
        current.order.reversed()
    } else {
        match field {
            SortField::Name => SortDirection::Ascending,
            SortField::Date | SortField::Amount => SortDirection::Descending,
        }
    };

    format!(
        "{}?{}",
        endpoints::ROOT,
        sort_query(SortSpec { sort: field, order })
    )
}

fn sort_query(sort: SortSpec) -> String {
    serde_urlencoded::to_string(sort).unwrap_or_default()
}

fn truncate_name(name: &str, max_length: usize) -> Cow<'_, str> {
    let mut graphemes = name.grapheme_indices(true);

    match graphemes.nth(max_length) {
        Some((end, _)) => Cow::Owned(format!("{}…", &name[..end])),
        None => Cow::Borrowed(name),
    }
}
