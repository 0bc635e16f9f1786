//! Record normalization.
//!
//! Rows reach the client from hand-edited spreadsheets, CSV imports and the
//! REST surface, so the same field may arrive under an English key, a Korean
//! header, as a number or as text. Everything here is pure and never fails:
//! a field that cannot be understood degrades to an empty value or a
//! sentinel so one bad row never hides the rest of the sheet.
//!
//! Normalizing an already canonical record returns it unchanged.

use log::warn;
use serde_json::{Map, Value};
use shared::dates::{format_date, parse_calendar_date};
use shared::{coerce_amount_value, Transaction, UNCATEGORIZED};

/// Stands in for a vendor cell that holds a date
pub const VENDOR_ERROR: &str = "Vendor_Error";

const ID_KEYS: &[&str] = &["id", "ID"];
const DATE_KEYS: &[&str] = &["date", "approval_date", "승인 날짜", "날짜"];
const VENDOR_KEYS: &[&str] = &["vendor", "merchant", "거래처"];
const AMOUNT_KEYS: &[&str] = &["amount", "금액"];
const METHOD_KEYS: &[&str] = &["method", "payment_method", "지불방법", "결제수단"];
const CYCLE_KEYS: &[&str] = &["cycle", "payment_cycle", "결제 주기", "주기"];
const CATEGORY_KEYS: &[&str] = &["category", "카테고리"];
const CONTENT_KEYS: &[&str] = &["content", "내용"];
const DELETED_KEYS: &[&str] = &["isDeleted", "is_deleted", "deleted"];

/// Normalize every object in a fetched batch, dropping non-objects and
/// soft-deleted rows.
pub fn normalize_batch(rows: &[Value]) -> Vec<Transaction> {
    let mut transactions = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let Some(record) = row.as_object() else {
            warn!("Skipping row {}: not an object", index);
            continue;
        };
        if is_deleted(record) {
            warn!("Skipping row {}: marked deleted", index);
            continue;
        }
        if let Some(transaction) = normalize_record(row) {
            transactions.push(transaction);
        }
    }
    transactions
}

/// Map one loosely typed row onto a [`Transaction`]. Returns `None` only when
/// the row is not a JSON object.
pub fn normalize_record(row: &Value) -> Option<Transaction> {
    let record = row.as_object()?;

    let id = resolve(record, ID_KEYS);
    let mut date = resolve(record, DATE_KEYS);
    let vendor = resolve(record, VENDOR_KEYS);
    let mut amount = resolve(record, AMOUNT_KEYS);

    if vendor.is_some_and(is_date_like)
        && !date.is_some_and(is_date_like)
        && date.is_some_and(|d| numeric_value(d).is_some())
    {
        let (repaired_date, repaired_amount) = repair_shifted_columns(record);
        if repaired_date.is_some() {
            date = repaired_date;
        }
        if repaired_amount.is_some() {
            amount = repaired_amount;
        }
    }

    let merchant = match vendor {
        Some(v) if is_date_like(v) => VENDOR_ERROR.to_string(),
        Some(v) => text_of(v),
        None => String::new(),
    };

    let category = text_of_or(resolve(record, CATEGORY_KEYS), "");
    Some(Transaction {
        id: text_of_or(id, ""),
        date: date.map(render_date).unwrap_or_default(),
        merchant,
        amount: amount.map(coerce_amount_value).unwrap_or(0.0),
        payment_method: text_of_or(resolve(record, METHOD_KEYS), ""),
        payment_cycle: text_of_or(resolve(record, CYCLE_KEYS), ""),
        category: if category.is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            category
        },
        content: text_of_or(resolve(record, CONTENT_KEYS), ""),
    })
}

/// Recover the date and amount of a row whose columns slid sideways.
///
/// The date is the first date-like value in source order; the amount is the
/// first positive number that is neither the identifier nor that date.
pub fn repair_shifted_columns(record: &Map<String, Value>) -> (Option<&Value>, Option<&Value>) {
    let id = resolve(record, ID_KEYS);
    let date = record.values().find(|v| is_date_like(v));
    let amount = record
        .iter()
        .filter(|(key, _)| !ID_KEYS.contains(&key.as_str()))
        .map(|(_, value)| value)
        .filter(|value| Some(*value) != id && Some(*value) != date)
        .find(|value| numeric_value(value).is_some_and(|n| n > 0.0));
    (date, amount)
}

/// `YYYY-MM-DD` prefix or an RFC 3339 timestamp. Only text qualifies.
pub fn is_date_like(value: &Value) -> bool {
    let Some(text) = value.as_str() else {
        return false;
    };
    let text = text.trim();
    has_iso_date_prefix(text) || chrono::DateTime::parse_from_rfc3339(text).is_ok()
}

fn has_iso_date_prefix(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

/// Numbers and numeric text. Booleans never count.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_end_matches('원')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
        _ => None,
    }
}

/// First key of `keys` holding a non-empty value
fn resolve<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| record.get(*key)).find(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

fn render_date(value: &Value) -> String {
    value
        .as_str()
        .and_then(parse_calendar_date)
        .map(format_date)
        .unwrap_or_default()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(|f| f.to_string()).unwrap_or_default(),
        },
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn text_of_or(value: Option<&Value>, default: &str) -> String {
    value.map(text_of).unwrap_or_else(|| default.to_string())
}

fn is_deleted(record: &Map<String, Value>) -> bool {
    DELETED_KEYS
        .iter()
        .filter_map(|key| record.get(*key))
        .any(|value| match value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_i64() == Some(1),
            Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
            _ => false,
        })
}
