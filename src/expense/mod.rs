//! Expenses: the core data model, plus the pages and endpoints for listing,
//! adding, editing and deleting them.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_page;
mod form;
mod ledger_page;
mod list_endpoint;

pub use core::{Expense, ExpenseInput, ExpenseName, LocalId, LocalIdGenerator, RemoteId};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_page::{cancel_edit_endpoint, get_edit_expense_page, update_expense_endpoint};
pub use ledger_page::{get_expense_list, get_ledger_page};
pub use list_endpoint::{ExpenseListResponse, list_expenses_endpoint};
