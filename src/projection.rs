//! Derives the display-ordered list of expenses and the running total.
//!
//! Everything here is recomputed from the ledger on every call so the view
//! can never drift from the store's contents.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    currency::{AmountSign, format_currency, round_to_cents},
    expense::{Expense, LocalId, RemoteId},
};

/// The field to order the expense list by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// The expense date. Undated expenses always come last.
    #[default]
    Date,
    /// The expense name, ignoring case.
    Name,
    /// The expense amount.
    Amount,
}

/// The direction to order the expense list in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Smallest, earliest or alphabetically first at the top.
    #[serde(rename = "asc")]
    Ascending,
    /// Largest, newest or alphabetically last at the top.
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// The other direction.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// How to order the expense list. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// The field to sort by.
    #[serde(default)]
    pub sort: SortField,
    /// The direction to sort in.
    #[serde(default)]
    pub order: SortDirection,
}

/// Something the user can do to a single expense in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Open the edit session for the expense.
    Edit,
    /// Delete the expense, after the user confirms.
    Delete,
}

/// An entry in the action table: an action bound to the expense it acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordAction {
    /// What to do.
    pub kind: ActionKind,
    /// The expense to do it to.
    pub remote_id: RemoteId,
}

impl RecordAction {
    /// Open the edit session for `remote_id`.
    pub fn edit(remote_id: RemoteId) -> Self {
        Self {
            kind: ActionKind::Edit,
            remote_id,
        }
    }

    /// Delete `remote_id`.
    pub fn delete(remote_id: RemoteId) -> Self {
        Self {
            kind: ActionKind::Delete,
            remote_id,
        }
    }
}

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// An expense with its fields formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRow {
    /// The store's key for the expense, used by the edit and delete routes.
    pub remote_id: RemoteId,
    /// The ID this client gave the expense when it was created.
    pub local_id: LocalId,
    /// What the money was spent on.
    pub name: String,
    /// Negative for refunds and income.
    pub amount: f64,
    /// The amount formatted as dollars, e.g. "-$12.50".
    pub amount_text: String,
    /// Used to style the amount.
    pub amount_sign: AmountSign,
    /// Serialized as "YYYY-MM-DD", or null if the expense has no date.
    #[serde(with = "iso_date::option")]
    pub date: Option<Date>,
    /// "Today", "Yesterday" or the calendar date. `None` for undated expenses.
    pub date_text: Option<String>,
    /// The edit and delete actions offered for this row.
    pub actions: Vec<RecordAction>,
}

/// The display-ordered expense list and the total of every expense.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    /// The expenses in display order.
    pub rows: Vec<ExpenseRow>,
    /// The sum of every amount, rounded to the cent.
    pub total: f64,
    /// The total formatted as dollars.
    pub total_text: String,
    /// Whether the total is shown as money spent or money earned.
    pub total_sign: AmountSign,
}

const DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[weekday repr:short] [month repr:short] [day] [year]");

/// Format `date` relative to `today`: "Today", "Yesterday", or e.g.
/// "Mon Oct 19 2026".
pub fn format_date_label(date: Date, today: Date) -> String {
    if date == today {
        "Today".to_owned()
    } else if Some(date) == today.previous_day() {
        "Yesterday".to_owned()
    } else {
        date.format(DATE_FORMAT)
            .unwrap_or_else(|_| date.to_string())
    }
}

/// Order `expenses` by `sort` and format them for display.
///
/// Expenses that compare equal keep their order in `expenses`.
pub fn project(expenses: &[Expense], sort: SortSpec, today: Date) -> Projection {
    let mut ordered: Vec<&Expense> = expenses.iter().collect();
    ordered.sort_by(|a, b| compare(a, b, sort));

    let total = round_to_cents(expenses.iter().map(|expense| expense.amount).sum());

    Projection {
        rows: ordered
            .into_iter()
            .map(|expense| to_row(expense, today))
            .collect(),
        total,
        total_text: format_currency(total),
        total_sign: AmountSign::of(total),
    }
}

fn compare(a: &Expense, b: &Expense, sort: SortSpec) -> Ordering {
    let directed = |ordering: Ordering| match sort.order {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    };

    match sort.sort {
        SortField::Date => match (a.date, b.date) {
            (Some(a), Some(b)) => directed(a.cmp(&b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortField::Name => directed(
            a.name
                .as_ref()
                .to_lowercase()
                .cmp(&b.name.as_ref().to_lowercase()),
        ),
        SortField::Amount => directed(a.amount.total_cmp(&b.amount)),
    }
}

fn to_row(expense: &Expense, today: Date) -> ExpenseRow {
    ExpenseRow {
        remote_id: expense.remote_id.clone(),
        local_id: expense.local_id,
        name: expense.name.to_string(),
        amount: expense.amount,
        amount_text: format_currency(expense.amount),
        amount_sign: AmountSign::of(expense.amount),
        date: expense.date,
        date_text: expense.date.map(|date| format_date_label(date, today)),
        actions: vec![
            RecordAction::edit(expense.remote_id.clone()),
            RecordAction::delete(expense.remote_id.clone()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use crate::{
        currency::AmountSign,
        expense::{Expense, ExpenseName, LocalId, RemoteId},
    };

    use super::{
        ActionKind, SortDirection, SortField, SortSpec, format_date_label, project,
    };

    const TODAY: Date = date!(2026 - 10 - 19);

    fn expense(id: &str, name: &str, amount: f64, date: Option<Date>) -> Expense {
        Expense {
            remote_id: RemoteId::new(id),
            local_id: LocalId::new(0),
            name: ExpenseName::new(name).unwrap(),
            amount,
            date,
        }
    }

    fn order(expenses: &[Expense], sort: SortSpec) -> Vec<String> {
        project(expenses, sort, TODAY)
            .rows
            .into_iter()
            .map(|row| row.remote_id.to_string())
            .collect()
    }

    #[test]
    fn default_order_is_newest_first() {
        let expenses = [
            expense("old", "A", 1.0, Some(date!(2026 - 01 - 01))),
            expense("new", "B", 1.0, Some(date!(2026 - 10 - 01))),
            expense("mid", "C", 1.0, Some(date!(2026 - 05 - 01))),
        ];

        assert_eq!(order(&expenses, SortSpec::default()), ["new", "mid", "old"]);
    }

    #[test]
    fn equal_dates_keep_snapshot_order() {
        let same_day = Some(date!(2026 - 10 - 01));
        let expenses = [
            expense("first", "A", 1.0, same_day),
            expense("newer", "B", 1.0, Some(date!(2026 - 10 - 02))),
            expense("second", "C", 1.0, same_day),
            expense("third", "D", 1.0, same_day),
        ];

        assert_eq!(
            order(&expenses, SortSpec::default()),
            ["newer", "first", "second", "third"]
        );
    }

    #[test]
    fn undated_expenses_always_come_last() {
        let expenses = [
            expense("undated-1", "A", 1.0, None),
            expense("dated-1", "B", 1.0, Some(date!(2026 - 01 - 01))),
            expense("undated-2", "C", 1.0, None),
            expense("dated-2", "D", 1.0, Some(date!(2026 - 02 - 01))),
        ];

        assert_eq!(
            order(&expenses, SortSpec::default()),
            ["dated-2", "dated-1", "undated-1", "undated-2"]
        );
        assert_eq!(
            order(
                &expenses,
                SortSpec {
                    sort: SortField::Date,
                    order: SortDirection::Ascending,
                }
            ),
            ["dated-1", "dated-2", "undated-1", "undated-2"]
        );
    }

    #[test]
    fn sorts_by_name_ignoring_case() {
        let expenses = [
            expense("b", "banana", 1.0, None),
            expense("a", "Apple", 1.0, None),
            expense("c", "cherry", 1.0, None),
        ];

        let ascending = SortSpec {
            sort: SortField::Name,
            order: SortDirection::Ascending,
        };
        assert_eq!(order(&expenses, ascending), ["a", "b", "c"]);
        assert_eq!(
            order(
                &expenses,
                SortSpec {
                    order: SortDirection::Descending,
                    ..ascending
                }
            ),
            ["c", "b", "a"]
        );
    }

    #[test]
    fn sorts_by_amount() {
        let expenses = [
            expense("ten", "A", 10.0, None),
            expense("refund", "B", -5.0, None),
            expense("one", "C", 1.0, None),
        ];

        assert_eq!(
            order(
                &expenses,
                SortSpec {
                    sort: SortField::Amount,
                    order: SortDirection::Ascending,
                }
            ),
            ["refund", "one", "ten"]
        );
        assert_eq!(
            order(
                &expenses,
                SortSpec {
                    sort: SortField::Amount,
                    order: SortDirection::Descending,
                }
            ),
            ["ten", "one", "refund"]
        );
    }

    #[test]
    fn total_is_sum_of_all_amounts() {
        let expenses = [
            expense("a", "A", 3.5, None),
            expense("b", "B", 10.25, Some(TODAY)),
            expense("c", "C", -1.75, None),
        ];

        let first = project(&expenses, SortSpec::default(), TODAY);
        let second = project(&expenses, SortSpec::default(), TODAY);

        assert_eq!(first.total, 12.0);
        assert_eq!(first.total_text, "$12.00");
        assert_eq!(first.total_sign, AmountSign::NonNegative);
        assert_eq!(first.total_text, second.total_text);
    }

    #[test]
    fn negative_total_is_flagged() {
        let expenses = [expense("a", "Refund", -12.5, None)];

        let projection = project(&expenses, SortSpec::default(), TODAY);

        assert_eq!(projection.total_text, "-$12.50");
        assert_eq!(projection.total_sign, AmountSign::Negative);
        assert_eq!(projection.rows[0].amount_sign, AmountSign::Negative);
    }

    #[test]
    fn total_residue_rounds_to_zero() {
        let expenses = [
            expense("a", "A", 0.1, None),
            expense("b", "B", 0.2, None),
            expense("c", "C", -0.3, None),
        ];

        let projection = project(&expenses, SortSpec::default(), TODAY);

        assert_eq!(projection.total, 0.0);
        assert_eq!(projection.total_text, "$0.00");
        assert_eq!(projection.total_sign, AmountSign::NonNegative);
    }

    #[test]
    fn empty_ledger_totals_zero() {
        let projection = project(&[], SortSpec::default(), TODAY);

        assert!(projection.rows.is_empty());
        assert_eq!(projection.total_text, "$0.00");
    }

    #[test]
    fn labels_today_and_yesterday() {
        assert_eq!(format_date_label(TODAY, TODAY), "Today");
        assert_eq!(format_date_label(date!(2026 - 10 - 18), TODAY), "Yesterday");
        assert_eq!(
            format_date_label(date!(2026 - 10 - 17), TODAY),
            "Sat Oct 17 2026"
        );
        assert_eq!(
            format_date_label(date!(2026 - 10 - 20), TODAY),
            "Tue Oct 20 2026"
        );
    }

    #[test]
    fn yesterday_crosses_year_boundary() {
        assert_eq!(
            format_date_label(date!(2025 - 12 - 31), date!(2026 - 01 - 01)),
            "Yesterday"
        );
    }

    #[test]
    fn rows_carry_formatted_fields_and_actions() {
        let expenses = [
            expense("dated", "Coffee", 3.5, Some(TODAY)),
            expense("undated", "Tea", 2.0, None),
        ];

        let projection = project(&expenses, SortSpec::default(), TODAY);

        let dated = &projection.rows[0];
        assert_eq!(dated.amount_text, "$3.50");
        assert_eq!(dated.date_text.as_deref(), Some("Today"));
        let kinds: Vec<_> = dated.actions.iter().map(|action| action.kind).collect();
        assert_eq!(kinds, [ActionKind::Edit, ActionKind::Delete]);
        assert!(
            dated
                .actions
                .iter()
                .all(|action| action.remote_id == RemoteId::new("dated"))
        );
        assert_eq!(projection.rows[1].date_text, None);
    }
}
