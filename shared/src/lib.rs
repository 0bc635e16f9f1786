//! Wire types shared by the expense tracker server and its clients.
//!
//! Everything that crosses the HTTP boundary lives here so both sides agree
//! on field names. The pure calculation helpers (dates, payment cycles,
//! amount coercion and the aggregation engine) live in submodules because the
//! server's calendar endpoint and the client's view models both need them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod aggregation;
pub mod amount;
pub mod dates;
pub mod payment_cycle;

pub use amount::{coerce_amount, coerce_amount_value};
pub use dates::YearMonth;
pub use payment_cycle::PaymentCycle;

/// Category assigned to expenses recorded without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single normalized expense as the client sees it.
///
/// `date` is always either `YYYY-MM-DD` or empty when the source value could
/// not be parsed; records with an empty date still count toward groupings but
/// never toward day or month totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub merchant: String,
    pub amount: f64,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub payment_cycle: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
}

impl Transaction {
    /// Calendar day of this transaction, if it has a valid one
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Recurring payment recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payee {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub payment_cycle: String,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// Amount as submitted by a form: either a JSON number or free text like "4,500원"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn value(&self) -> f64 {
        match self {
            AmountInput::Number(n) => amount::sanitize(*n),
            AmountInput::Text(s) => coerce_amount(s),
        }
    }

    /// The amount when one was actually given; blank or unparseable text is `None`
    pub fn supplied(&self) -> Option<f64> {
        match self {
            AmountInput::Number(n) => Some(amount::sanitize(*n)),
            AmountInput::Text(s) => amount::parse_amount(s),
        }
    }
}

impl Default for AmountInput {
    fn default() -> Self {
        AmountInput::Number(0.0)
    }
}

// ---------------------------------------------------------------------------
// REST surface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    #[serde(default, alias = "approval_date")]
    pub date: String,
    #[serde(default)]
    pub merchant: String,
    #[serde(default)]
    pub amount: AmountInput,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub payment_cycle: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    #[serde(default, alias = "approval_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<AmountInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_cycle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseResponse {
    pub expense: Transaction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Body of every non-2xx REST response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantTotal {
    pub merchant: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodTotal {
    pub payment_method: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCycleTotal {
    pub payment_cycle: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Totals ranked by amount, largest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub total_amount: f64,
    pub merchant_totals: Vec<MerchantTotal>,
    pub payment_totals: Vec<PaymentMethodTotal>,
    pub cycle_totals: Vec<PaymentCycleTotal>,
    #[serde(default)]
    pub category_totals: Vec<CategoryTotal>,
}

/// One day of the calendar endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub total: f64,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_payments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarDataResponse {
    /// Keyed by `YYYY-MM-DD`
    pub daily_data: BTreeMap<String, DailySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayeeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub payment_cycle: String,
    #[serde(default)]
    pub amount: Option<AmountInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayeeResponse {
    pub payee: Payee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayeeListResponse {
    pub payees: Vec<Payee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportCsvResponse {
    pub inserted: usize,
    pub errors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Sheet action surface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetStatus {
    Success,
    Error,
}

impl fmt::Display for SheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetStatus::Success => write!(f, "success"),
            SheetStatus::Error => write!(f, "error"),
        }
    }
}

/// Envelope returned by every `action=` request.
///
/// `data` rows are left as raw JSON objects: the sheet stores cells as typed
/// by whoever wrote them, so the client runs them through its normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetResponse {
    pub status: SheetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SheetResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: SheetStatus::Success,
            message: Some(message.into()),
            data: None,
            id: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SheetStatus::Error,
            message: Some(message.into()),
            data: None,
            id: None,
        }
    }

    pub fn rows(data: Vec<serde_json::Value>) -> Self {
        Self {
            status: SheetStatus::Success,
            message: None,
            data: Some(data),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Messages the sheet surface uses for its error payloads
pub mod sheet_messages {
    pub const INVALID_API_KEY: &str = "Invalid API Key";
    pub const ID_NOT_FOUND: &str = "ID not found";
    pub const UNKNOWN_ACTION: &str = "Unknown action";
    pub const EXPENSE_CREATED: &str = "Expense created";
    pub const EXPENSE_UPDATED: &str = "Expense updated";
    pub const EXPENSE_DELETED: &str = "Expense deleted";
}
