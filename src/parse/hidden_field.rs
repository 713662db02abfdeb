//! Pulls ASP.NET hidden form tokens out of raw page text.
//!
//! This is a plain text scan rather than a DOM query so that it keeps working
//! on markup the HTML parser would restructure. The `value` attribute has to
//! follow the `name` attribute within [`VALUE_WINDOW`] bytes.

pub const VIEW_STATE: &str = "__VIEWSTATE";
pub const EVENT_VALIDATION: &str = "__EVENTVALIDATION";
pub const VIEW_STATE_GENERATOR: &str = "__VIEWSTATEGENERATOR";

/// How far past `name="..."` to look for `value="`.
pub const VALUE_WINDOW: usize = 200;
const VALUE_PATTERN: &str = r#"value=""#;

/// Returns the value of the first hidden field called `field_name`, or an
/// empty string when it can't be found.
#[must_use]
pub fn extract_hidden_field<'a>(html: &'a str, field_name: &str) -> &'a str {
    let name_pattern = format!(r#"name="{field_name}""#);
    let Some(name_start) = html.find(&name_pattern) else {
        return "";
    };

    let mut window_end = (name_start + VALUE_WINDOW).min(html.len());
    while !html.is_char_boundary(window_end) {
        window_end -= 1;
    }

    let Some(value_offset) = html[name_start..window_end].find(VALUE_PATTERN) else {
        return "";
    };
    let value_start = name_start + value_offset + VALUE_PATTERN.len();

    html[value_start..]
        .find('"')
        .map_or("", |len| &html[value_start..value_start + len])
}

#[must_use]
pub fn extract_view_state(html: &str) -> &str {
    extract_hidden_field(html, VIEW_STATE)
}

#[must_use]
pub fn extract_event_validation(html: &str) -> &str {
    extract_hidden_field(html, EVENT_VALIDATION)
}

#[must_use]
pub fn extract_view_state_generator(html: &str) -> &str {
    extract_hidden_field(html, VIEW_STATE_GENERATOR)
}
