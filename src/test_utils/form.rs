use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let hx_endpoint = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        hx_endpoint, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {hx_endpoint:?}"
    );
}

#[track_caller]
fn must_get_input<'a>(form: &ElementRef<'a>, name: &str, type_: &str) -> ElementRef<'a> {
    for input in form.select(&Selector::parse("input").unwrap()) {
        if input.value().attr("name").unwrap_or_default() == name {
            let input_type = input.value().attr("type").unwrap_or_default();
            assert_eq!(
                input_type, type_,
                "want input with type \"{type_}\", got {input_type:?}"
            );

            return input;
        }
    }

    panic!("No input found with name \"{name}\" and type \"{type_}\"");
}

/// Assert the form has a required input `name` with the value `value`.
#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = must_get_input(form, name, type_);

    assert_input_value(&input, value);
    assert!(
        input.value().attr("required").is_some(),
        "want input with name {name} to have the required attribute but got none"
    );
}

/// Assert the form has an input `name` that may be left empty, with the value `value`.
#[track_caller]
pub(crate) fn assert_optional_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = must_get_input(form, name, type_);

    assert_input_value(&input, value);
    assert!(
        input.value().attr("required").is_none(),
        "want input with name {name} to be optional but it has the required attribute"
    );
}

#[track_caller]
fn assert_input_value(input: &ElementRef<'_>, value: &str) {
    let input_value = input.value().attr("value").unwrap_or_default();

    assert_eq!(
        input_value, value,
        "want input with value \"{value}\", got {input_value:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    let submit_button = form
        .select(&Selector::parse("button[type=submit]").unwrap())
        .next()
        .expect("No submit button found");

    let got_text = submit_button.text().collect::<Vec<_>>().join("");
    let got_text = got_text.trim();
    assert_eq!(text, got_text);
}

/// The text of every field error message in the form.
pub(crate) fn form_error_messages(form: &ElementRef<'_>) -> Vec<String> {
    form.select(&Selector::parse("p").unwrap())
        .map(|p| p.text().collect::<String>().trim().to_owned())
        .collect()
}
