#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod state;

pub(crate) use form::{
    assert_form_input_with_value, assert_form_submit_button_with_text, assert_hx_endpoint,
    assert_optional_form_input_with_value, form_error_messages, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_content_type, assert_hx_redirect, get_header};
pub(crate) use state::{must_create_app_state, must_create_expense, must_create_expense_state};
