//! The form used for both adding and editing expenses.

use maud::{Markup, html};

use crate::html::{
    BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_ERROR_TEXT_STYLE, FORM_LABEL_STYLE,
    FORM_TEXT_INPUT_ERROR_STYLE, FORM_TEXT_INPUT_STYLE,
};
use crate::validation::{ExpenseForm, Field, FormState};

/// How htmx should submit the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FormMethod {
    Post,
    Put,
}

pub(super) struct ExpenseFormView<'a> {
    pub id: &'a str,
    pub endpoint: &'a str,
    pub method: FormMethod,
    /// The values to pre-fill the inputs with.
    pub values: &'a ExpenseForm,
    pub state: &'a FormState,
    pub submit_label: &'a str,
    /// The endpoint that discards the form, if it can be cancelled.
    pub cancel_endpoint: Option<&'a str>,
}

impl ExpenseFormView<'_> {
    pub fn into_html(self) -> Markup {
        let (hx_post, hx_put) = match self.method {
            FormMethod::Post => (Some(self.endpoint), None),
            FormMethod::Put => (None, Some(self.endpoint)),
        };

        let input_style = |field: Field| {
            if self.state.shows_error(field) {
                FORM_TEXT_INPUT_ERROR_STYLE
            } else {
                FORM_TEXT_INPUT_STYLE
            }
        };

        let error_message = |field: Field, message: &str| {
            html! {
                @if self.state.shows_error(field) {
                    p class=(FORM_ERROR_TEXT_STYLE) { (message) }
                }
            }
        };

        html! {
            form
                id=(self.id)
                hx-post=[hx_post]
                hx-put=[hx_put]
                hx-target="this"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                class="w-full space-y-4"
            {
                div
                {
                    label for=(format!("{}-name", self.id)) class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        id=(format!("{}-name", self.id))
                        type="text"
                        name="name"
                        placeholder="Coffee"
                        value=(self.values.name)
                        required
                        class=(input_style(Field::Name));

                    (error_message(Field::Name, "Enter what the money was spent on."))
                }

                div
                {
                    label for=(format!("{}-amount", self.id)) class=(FORM_LABEL_STYLE) { "Amount" }

                    div class="input-wrapper"
                    {
                        input
                            id=(format!("{}-amount", self.id))
                            type="number"
                            name="amount"
                            step="0.01"
                            placeholder="0.00"
                            value=(self.values.amount)
                            required
                            class=(input_style(Field::Amount));
                    }

                    (error_message(Field::Amount, "Enter an amount, e.g. 3.50."))
                }

                div
                {
                    label for=(format!("{}-date", self.id)) class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        id=(format!("{}-date", self.id))
                        type="date"
                        name="date"
                        value=(self.values.date)
                        class=(input_style(Field::Date));

                    (error_message(Field::Date, "Enter a valid date or leave it empty."))
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (self.submit_label) }

                @if let Some(cancel_endpoint) = self.cancel_endpoint {
                    button
                        type="button"
                        hx-post=(cancel_endpoint)
                        hx-target-error="#alert-container"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Cancel"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::{
        test_utils::{
            assert_form_input_with_value, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_optional_form_input_with_value, must_get_form,
        },
        validation::{ExpenseForm, FormKind, ValidationService},
    };

    use super::{ExpenseFormView, FormMethod};

    fn render(values: &ExpenseForm, validation: &ValidationService, method: FormMethod) -> Html {
        let markup = ExpenseFormView {
            id: "expense-form",
            endpoint: "/api/expenses",
            method,
            values,
            state: validation.form(FormKind::Add),
            submit_label: "Add Expense",
            cancel_endpoint: None,
        }
        .into_html();

        Html::parse_fragment(&markup.into_string())
    }

    #[test]
    fn pristine_form_shows_no_errors() {
        let validation = ValidationService::new();

        let html = render(&ExpenseForm::default(), &validation, FormMethod::Post);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/expenses", "hx-post");
        assert_form_input_with_value(&form, "name", "text", "");
        assert_form_input_with_value(&form, "amount", "number", "");
        assert_optional_form_input_with_value(&form, "date", "date", "");
        assert_form_submit_button_with_text(&form, "Add Expense");
        assert_eq!(html.select(&Selector::parse("p").unwrap()).count(), 0);
    }

    #[test]
    fn amount_accepts_cents() {
        let validation = ValidationService::new();

        let html = render(&ExpenseForm::default(), &validation, FormMethod::Post);

        let amount = html
            .select(&Selector::parse("input[name=amount]").unwrap())
            .next()
            .expect("no amount input");
        assert_eq!(amount.value().attr("step"), Some("0.01"));
    }

    #[test]
    fn touched_form_shows_invalid_fields_only() {
        let mut validation = ValidationService::new();
        let values = ExpenseForm {
            name: "Coffee".to_owned(),
            amount: "abc".to_owned(),
            date: String::new(),
        };
        let _ = validation.validate(FormKind::Add, &values);

        let html = render(&values, &validation, FormMethod::Put);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/expenses", "hx-put");
        assert_form_input_with_value(&form, "name", "text", "Coffee");
        assert_form_input_with_value(&form, "amount", "number", "abc");
        let messages: Vec<String> = html
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect())
            .collect();
        assert_eq!(messages, ["Enter an amount, e.g. 3.50."]);
    }
}
