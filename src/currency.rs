//! Formats amounts of money in the app's single currency (US dollars).

use serde::Serialize;

/// Whether an amount is money spent or money earned, used to style amounts
/// and the running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountSign {
    /// Zero or more once rounded to the cent.
    NonNegative,
    /// Less than zero, e.g. a refund or income entered as a negative expense.
    Negative,
}

impl AmountSign {
    /// The sign of `amount` once rounded to the cent, so a sum like
    /// `0.1 + 0.2 - 0.3` counts as zero.
    pub fn of(amount: f64) -> Self {
        if to_cents(amount) < 0.0 {
            AmountSign::Negative
        } else {
            AmountSign::NonNegative
        }
    }

    /// The CSS classes for text displaying an amount with this sign.
    pub fn text_class(self) -> &'static str {
        match self {
            AmountSign::NonNegative => "text-gray-900 dark:text-white",
            AmountSign::Negative => "text-red-700 dark:text-red-300",
        }
    }
}

/// Round `amount` to the nearest cent.
pub fn round_to_cents(amount: f64) -> f64 {
    to_cents(amount) / 100.0
}

fn to_cents(amount: f64) -> f64 {
    let cents = (amount * 100.0).round();

    // Avoid "-$0.00" for amounts that round to zero from below.
    if cents == 0.0 { 0.0 } else { cents }
}

/// Format `number` as dollars with two decimal places, e.g. "$1,234.50" or
/// "-$12.50".
///
/// The amount is rounded to the cent first and always written out in full,
/// never in exponent notation.
pub fn format_currency(number: f64) -> String {
    let cents = to_cents(number);
    let sign = if cents < 0.0 { "-" } else { "" };
    // Float to int casts saturate, and non-finite amounts never reach the ledger.
    let cents = cents.abs() as u128;

    format!(
        "{sign}${}.{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}

fn group_thousands(dollars: u128) -> String {
    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}
