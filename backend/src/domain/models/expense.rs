use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{coerce_amount, dates::parse_calendar_date};

/// One row of the expense sheet.
///
/// Cells are kept as written (the sheet is shared with a spreadsheet UI, so
/// `amount` may be `"4500"` or `"4,500원"`); typed views are computed on
/// demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DomainExpense {
    pub id: String,
    pub vendor: String,
    pub amount: String,
    pub date: String,
    pub method: String,
    pub category: String,
    pub cycle: String,
    pub content: String,
    pub is_deleted: bool,
}

impl DomainExpense {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn amount_value(&self) -> f64 {
        coerce_amount(&self.amount)
    }

    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Expense not found: {0}")]
    NotFound(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
