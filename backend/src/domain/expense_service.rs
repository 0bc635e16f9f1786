//! Expense service domain logic.
//!
//! Owns every read and write of the expense sheet on behalf of both HTTP
//! surfaces.
//!
//! ## Business Rules
//!
//! - Ids are unique among rows. A read that finds blank or duplicated ids
//!   assigns fresh UUIDs and writes them back before returning.
//! - Deletion is soft: the row stays in the sheet with `isDeleted = true` and
//!   disappears from every query.
//! - Updates replace only the fields that were supplied with a non-empty
//!   value.
//! - Every mutation runs inside the shared [`WriteLock`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::commands::expenses::{
    CreateExpenseCommand, EntryPolicy, ImportResult, UpdateExpenseCommand,
};
use crate::domain::models::expense::{DomainExpense, ExpenseError};
use crate::storage::{Connection, ExpenseStorage, WriteLock};
use shared::dates::{format_date, parse_calendar_date};

/// Column headers of the card-statement CSV used for import and export
pub const STATEMENT_HEADER: [&str; 5] = ["학원", "금액", "승인 날짜", "거래처", "결제 주기"];

#[derive(Clone)]
pub struct ExpenseService<C: Connection> {
    expense_repository: Arc<C::ExpenseRepository>,
    write_lock: WriteLock,
}

impl<C: Connection> ExpenseService<C> {
    pub fn new(connection: Arc<C>, write_lock: WriteLock) -> Self {
        Self {
            expense_repository: Arc::new(connection.create_expense_repository()),
            write_lock,
        }
    }

    /// Live expenses in sheet order, repairing identifiers first if needed
    pub async fn list_expenses(&self) -> Result<Vec<DomainExpense>, ExpenseError> {
        let rows = self.expense_repository.list_all_rows().await?;
        if !needs_identifier_repair(&rows) {
            return Ok(rows.into_iter().filter(DomainExpense::is_active).collect());
        }

        let _guard = self.write_lock.acquire("identifier repair").await;
        // Re-read under the lock so a concurrent append is not lost
        let mut rows = self.expense_repository.list_all_rows().await?;
        let repaired = repair_identifiers(&mut rows);
        if repaired > 0 {
            self.expense_repository.replace_all_rows(&rows).await?;
            info!("Assigned fresh ids to {} expense rows", repaired);
        }
        Ok(rows.into_iter().filter(DomainExpense::is_active).collect())
    }

    pub async fn get_expense(&self, id: &str) -> Result<DomainExpense, ExpenseError> {
        self.expense_repository
            .get_expense(id)
            .await?
            .ok_or_else(|| ExpenseError::NotFound(id.to_string()))
    }

    /// Append a new expense and return it as stored
    pub async fn create_expense(
        &self,
        command: CreateExpenseCommand,
        policy: EntryPolicy,
    ) -> Result<DomainExpense, ExpenseError> {
        let mut date = command.date;
        if policy == EntryPolicy::Strict {
            require("merchant", &command.vendor)?;
            require("date", &date)?;
            require("payment_method", &command.method)?;
            require("payment_cycle", &command.cycle)?;
            date = normalize_date(&date)?;
        }

        let expense = DomainExpense {
            id: command
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(DomainExpense::generate_id),
            vendor: command.vendor.trim().to_string(),
            amount: command.amount.trim().to_string(),
            date,
            method: command.method.trim().to_string(),
            category: command.category.trim().to_string(),
            cycle: command.cycle.trim().to_string(),
            content: command.content,
            is_deleted: false,
        };

        let _guard = self.write_lock.acquire("create expense").await;
        self.expense_repository.store_expense(&expense).await?;
        info!("Created expense {} ({} {})", expense.id, expense.vendor, expense.amount);
        Ok(expense)
    }

    /// Replace the supplied fields of an existing expense
    pub async fn update_expense(
        &self,
        command: UpdateExpenseCommand,
        policy: EntryPolicy,
    ) -> Result<DomainExpense, ExpenseError> {
        let _guard = self.write_lock.acquire("update expense").await;

        let mut expense = self
            .expense_repository
            .get_expense(&command.id)
            .await?
            .ok_or_else(|| ExpenseError::NotFound(command.id.clone()))?;

        if let Some(date) = supplied(command.date) {
            expense.date = match policy {
                EntryPolicy::Strict => normalize_date(&date)?,
                EntryPolicy::AsWritten => date,
            };
        }
        if let Some(vendor) = supplied(command.vendor) {
            expense.vendor = vendor;
        }
        if let Some(amount) = supplied(command.amount) {
            expense.amount = amount;
        }
        if let Some(method) = supplied(command.method) {
            expense.method = method;
        }
        if let Some(category) = supplied(command.category) {
            expense.category = category;
        }
        if let Some(cycle) = supplied(command.cycle) {
            expense.cycle = cycle;
        }
        if let Some(content) = supplied(command.content) {
            expense.content = content;
        }

        if !self.expense_repository.update_expense(&expense).await? {
            return Err(ExpenseError::NotFound(command.id));
        }
        info!("Updated expense {}", expense.id);
        Ok(expense)
    }

    /// Soft-delete an expense
    pub async fn delete_expense(&self, id: &str) -> Result<(), ExpenseError> {
        let _guard = self.write_lock.acquire("delete expense").await;
        if !self.expense_repository.mark_deleted(id).await? {
            return Err(ExpenseError::NotFound(id.to_string()));
        }
        info!("Soft-deleted expense {}", id);
        Ok(())
    }

    /// Case-insensitive match on vendor or payment method, newest first
    pub async fn search_expenses(&self, query: &str) -> Result<Vec<DomainExpense>, ExpenseError> {
        let needle = query.trim().to_lowercase();
        let mut matches: Vec<DomainExpense> = self
            .list_expenses()
            .await?
            .into_iter()
            .filter(|e| {
                needle.is_empty()
                    || e.vendor.to_lowercase().contains(&needle)
                    || e.method.to_lowercase().contains(&needle)
            })
            .collect();
        matches.sort_by(|a, b| b.calendar_date().cmp(&a.calendar_date()));
        Ok(matches)
    }

    /// Import a card-statement CSV. Rows without a merchant or date are
    /// skipped silently, rows with an unparseable date are reported, and rows
    /// matching an existing expense on merchant, amount and date are skipped.
    pub async fn import_statement_csv(&self, text: &str) -> Result<ImportResult, ExpenseError> {
        let text = text.trim_start_matches('\u{feff}');
        let mut reader = ::csv::ReaderBuilder::new()
            .flexible(true)
            .trim(::csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers().map_err(anyhow::Error::from)?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let (merchant_col, amount_col, date_col, method_col, cycle_col) = (
            column(STATEMENT_HEADER[0]),
            column(STATEMENT_HEADER[1]),
            column(STATEMENT_HEADER[2]),
            column(STATEMENT_HEADER[3]),
            column(STATEMENT_HEADER[4]),
        );

        let _guard = self.write_lock.acquire("statement import").await;
        let existing = self.expense_repository.list_expenses().await?;
        let mut seen: HashSet<(String, u64, String)> = existing
            .iter()
            .map(|e| duplicate_key(&e.vendor, e.amount_value(), &e.date))
            .collect();

        let mut result = ImportResult::default();
        for (index, record) in reader.records().enumerate() {
            // header is line 1
            let line = index + 2;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    result.errors.push(format!("Row {}: {}", line, e));
                    continue;
                }
            };
            let cell = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("").to_string();

            let merchant = cell(merchant_col);
            let raw_date = cell(date_col);
            if merchant.is_empty() || raw_date.is_empty() {
                continue;
            }
            let Some(date) = parse_calendar_date(&raw_date).map(format_date) else {
                result.errors.push(format!("Row {}: invalid date ({})", line, raw_date));
                continue;
            };
            let amount = shared::coerce_amount(&cell(amount_col));

            if !seen.insert(duplicate_key(&merchant, amount, &date)) {
                continue;
            }

            let expense = DomainExpense {
                id: DomainExpense::generate_id(),
                vendor: merchant,
                amount: amount.to_string(),
                date,
                method: cell(method_col),
                cycle: cell(cycle_col),
                ..Default::default()
            };
            self.expense_repository.store_expense(&expense).await?;
            result.inserted += 1;
        }

        if !result.errors.is_empty() {
            warn!("Statement import finished with {} errors", result.errors.len());
        }
        info!("Imported {} expenses from statement CSV", result.inserted);
        Ok(result)
    }

    /// Live expenses as a card-statement CSV, oldest first
    pub async fn export_statement_csv(&self) -> Result<String, ExpenseError> {
        let mut expenses = self.list_expenses().await?;
        expenses.sort_by(|a, b| a.calendar_date().cmp(&b.calendar_date()));

        let mut writer = ::csv::Writer::from_writer(Vec::new());
        writer.write_record(STATEMENT_HEADER).map_err(anyhow::Error::from)?;
        for expense in &expenses {
            let date = expense.calendar_date().map(format_date).unwrap_or_default();
            let amount = expense.amount_value().to_string();
            writer
                .write_record([
                    expense.vendor.as_str(),
                    amount.as_str(),
                    date.as_str(),
                    expense.method.as_str(),
                    expense.cycle.as_str(),
                ])
                .map_err(anyhow::Error::from)?;
        }
        let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
        Ok(String::from_utf8(bytes).map_err(anyhow::Error::from)?)
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ExpenseError> {
    if value.trim().is_empty() {
        Err(ExpenseError::MissingField(field))
    } else {
        Ok(())
    }
}

fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize_date(raw: &str) -> Result<String, ExpenseError> {
    parse_calendar_date(raw)
        .map(format_date)
        .ok_or_else(|| ExpenseError::InvalidDate(raw.to_string()))
}

fn duplicate_key(merchant: &str, amount: f64, date: &str) -> (String, u64, String) {
    let date = parse_calendar_date(date).map(format_date).unwrap_or_default();
    (merchant.trim().to_string(), amount.to_bits(), date)
}

fn needs_identifier_repair(rows: &[DomainExpense]) -> bool {
    let mut seen = HashSet::new();
    rows.iter().any(|row| row.id.is_empty() || !seen.insert(row.id.as_str()))
}

/// Give every blank or repeated id a fresh UUID, scanning all rows (deleted
/// ones included) in sheet order. Returns how many rows changed.
pub fn repair_identifiers(rows: &mut [DomainExpense]) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    let mut repaired = 0;
    for row in rows.iter_mut() {
        if row.id.is_empty() || seen.contains(&row.id) {
            row.id = DomainExpense::generate_id();
            repaired += 1;
        }
        seen.insert(row.id.clone());
    }
    repaired
}
