//! Amount coercion.
//!
//! Sheet cells and form fields carry amounts as numbers or as text such as
//! `"12,000원"`. Aggregation needs a finite, non-negative number, so anything
//! that does not coerce cleanly counts as zero instead of failing the record.

use serde_json::Value;

/// Coerce free text into an amount, stripping thousands separators, spaces
/// and the won suffix.
pub fn coerce_amount(raw: &str) -> f64 {
    parse_amount(raw).unwrap_or(0.0)
}

/// Like [`coerce_amount`], but text that holds no number is `None`
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('원')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().map(sanitize)
}

/// Coerce a JSON cell into an amount
pub fn coerce_amount_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().map(sanitize).unwrap_or(0.0),
        Value::String(s) => coerce_amount(s),
        _ => 0.0,
    }
}

pub(crate) fn sanitize(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}
