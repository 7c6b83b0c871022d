//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::DateTime;
use itsolutions_core::format_amount;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for main.css.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Returns the content hash for carousel.js.
///
/// Usage in templates: `{{ ""|js_hash }}`
#[askama::filter_fn]
pub fn js_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("JS_HASH"))
}

/// Formats an amount of currency units with two decimals (`$12.00`).
///
/// Usage in templates: `{{ product.price|money }}`
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    let text = text.trim_start_matches('$');
    Ok(text
        .parse::<f64>()
        .map_or_else(|_| format!("${text}"), format_amount))
}

/// Formats a nanosecond timestamp as a calendar date.
///
/// Usage in templates: `{{ order.timestamp|order_date }}`
#[askama::filter_fn]
pub fn order_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.to_string().parse::<i64>().map_or_else(
        |_| String::new(),
        |nanos| {
            DateTime::from_timestamp_nanos(nanos)
                .format("%b %-d, %Y")
                .to_string()
        },
    ))
}
