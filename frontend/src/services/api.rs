use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{Transaction, YearMonth};
use thiserror::Error;

/// Form fields the client validates before talking to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Merchant,
    Date,
    Amount,
    PaymentMethod,
    PaymentCycle,
}

impl FormField {
    /// Name the REST surface uses for this field
    pub fn wire_name(&self) -> &'static str {
        match self {
            FormField::Merchant => "merchant",
            FormField::Date => "date",
            FormField::Amount => "amount",
            FormField::PaymentMethod => "payment_method",
            FormField::PaymentCycle => "payment_cycle",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "merchant" | "vendor" => Some(FormField::Merchant),
            "date" => Some(FormField::Date),
            "amount" => Some(FormField::Amount),
            "payment_method" | "method" => Some(FormField::PaymentMethod),
            "payment_cycle" | "cycle" => Some(FormField::PaymentCycle),
            _ => None,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Every failure the client reports to its screens.
///
/// None of these are retried; the screen shows the message and the user
/// decides what to do next.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{field}: {message}")]
    Validation { field: FormField, message: String },
    #[error("request failed: {0}")]
    Transport(String),
}

impl ClientError {
    pub fn validation(field: FormField, message: impl Into<String>) -> Self {
        ClientError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

/// Values submitted for a create or update. `None` leaves a field out of the
/// request entirely, which for updates means "unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFields {
    pub date: Option<String>,
    pub merchant: Option<String>,
    pub amount: Option<String>,
    pub payment_method: Option<String>,
    pub payment_cycle: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
}

impl ExpenseFields {
    /// `(sheet column, value)` pairs for the supplied, non-empty fields
    pub fn sheet_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("date", &self.date),
            ("vendor", &self.merchant),
            ("amount", &self.amount),
            ("method", &self.payment_method),
            ("cycle", &self.payment_cycle),
            ("category", &self.category),
            ("content", &self.content),
        ]
        .into_iter()
        .filter_map(|(column, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (column, v.to_string()))
        })
        .collect()
    }
}

/// Backend operations the coordinator depends on.
///
/// Both the sheet and REST clients implement this, and tests substitute an
/// in-memory fake.
#[async_trait]
pub trait ExpenseApi: Send + Sync {
    /// Every live expense, normalized
    async fn fetch_all(&self) -> Result<Vec<Transaction>, ClientError>;

    /// Returns the id the backend assigned
    async fn create(&self, fields: &ExpenseFields) -> Result<String, ClientError>;

    async fn update(&self, id: &str, fields: &ExpenseFields) -> Result<(), ClientError>;

    /// Soft delete
    async fn delete(&self, id: &str) -> Result<(), ClientError>;

    /// Scheduled payments for the month, keyed by day. Backends without a
    /// calendar endpoint have none.
    async fn next_payments(&self, _month: YearMonth) -> Result<BTreeMap<NaiveDate, Vec<String>>, ClientError> {
        Ok(BTreeMap::new())
    }
}
