//! Validation of the raw expense form input, with per-form "touched" state.
//!
//! A form that has never been submitted is pristine and never displays field
//! errors. The first submission marks it touched, after which every
//! submission updates the per-field validity.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    Error,
    expense::{ExpenseInput, ExpenseName},
};

/// The raw text values of the add or edit form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseForm {
    /// What the money was spent on.
    pub name: String,
    /// The amount as typed, e.g. "3.50".
    pub amount: String,
    /// An ISO 8601 date (YYYY-MM-DD), or empty for an undated expense.
    #[serde(default)]
    pub date: String,
}

/// The fields of [ExpenseForm] that have validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The expense name.
    Name,
    /// The expense amount.
    Amount,
    /// The expense date.
    Date,
}

/// Whether each field of a submitted form passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldValidity {
    /// The name is non-empty after trimming.
    pub name: bool,
    /// The amount parses to a finite number.
    pub amount: bool,
    /// The date is empty or a valid calendar date.
    pub date: bool,
}

impl FieldValidity {
    /// Every field is valid.
    pub const VALID: Self = Self {
        name: true,
        amount: true,
        date: true,
    };

    /// Whether the whole form passed.
    pub fn is_valid(&self) -> bool {
        self.name && self.amount && self.date
    }

    /// Whether `field` passed.
    pub fn is_field_valid(&self, field: Field) -> bool {
        match field {
            Field::Name => self.name,
            Field::Amount => self.amount,
            Field::Date => self.date,
        }
    }
}

impl Display for FieldValidity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let invalid: Vec<&str> = [
            (self.name, "name"),
            (self.amount, "amount"),
            (self.date, "date"),
        ]
        .into_iter()
        .filter(|(valid, _)| !valid)
        .map(|(_, field)| field)
        .collect();

        if invalid.is_empty() {
            write!(f, "no invalid fields")
        } else {
            write!(f, "invalid {}", invalid.join(", "))
        }
    }
}

/// Check `form` against the field rules without touching any form state.
///
/// Returns the validity of each field, and the validated input if every field
/// passed.
pub fn check_fields(form: &ExpenseForm) -> (FieldValidity, Option<ExpenseInput>) {
    let name = ExpenseName::new(&form.name).ok();
    let amount = parse_amount(&form.amount);
    let date = parse_date(&form.date);

    let validity = FieldValidity {
        name: name.is_some(),
        amount: amount.is_some(),
        date: date.is_some(),
    };

    let input = match (name, amount, date) {
        (Some(name), Some(amount), Some(date)) => Some(ExpenseInput { name, amount, date }),
        _ => None,
    };

    (validity, input)
}

fn parse_amount(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// `Some(None)` for an empty date, `None` for an invalid one.
fn parse_date(text: &str) -> Option<Option<Date>> {
    let text = text.trim();

    if text.is_empty() {
        return Some(None);
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(Some)
}

/// Which form a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    /// The form for adding a new expense.
    Add,
    /// The form for editing the expense in the current edit session.
    Edit,
}

/// The validation state of a single form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormState {
    touched: bool,
    validity: FieldValidity,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            touched: false,
            validity: FieldValidity::VALID,
        }
    }
}

impl FormState {
    /// Whether the form has been submitted at least once.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// The validity from the latest submission.
    pub fn validity(&self) -> FieldValidity {
        self.validity
    }

    /// Whether `field` should be displayed as invalid.
    pub fn shows_error(&self, field: Field) -> bool {
        self.touched && !self.validity.is_field_valid(field)
    }
}

/// Validates form submissions and remembers the state of each form.
#[derive(Debug, Clone, Default)]
pub struct ValidationService {
    add: FormState,
    edit: FormState,
}

impl ValidationService {
    /// Create a service where both forms are pristine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a submission of the `kind` form.
    ///
    /// The form is marked as touched regardless of the outcome.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidExpense] with the per-field validity if any field
    /// failed.
    pub fn validate(&mut self, kind: FormKind, form: &ExpenseForm) -> Result<ExpenseInput, Error> {
        let (validity, input) = check_fields(form);

        let state = self.state_mut(kind);
        state.touched = true;
        state.validity = validity;

        input.ok_or(Error::InvalidExpense(validity))
    }

    /// The current state of the `kind` form.
    pub fn form(&self, kind: FormKind) -> &FormState {
        match kind {
            FormKind::Add => &self.add,
            FormKind::Edit => &self.edit,
        }
    }

    /// Return the `kind` form to its pristine state.
    pub fn reset(&mut self, kind: FormKind) {
        *self.state_mut(kind) = FormState::default();
    }

    fn state_mut(&mut self, kind: FormKind) -> &mut FormState {
        match kind {
            FormKind::Add => &mut self.add,
            FormKind::Edit => &mut self.edit,
        }
    }
}
