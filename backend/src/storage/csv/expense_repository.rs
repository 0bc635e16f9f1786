//! Expense sheet repository.
//!
//! Rows are read whole on every call (the sheet is small and may be edited
//! by hand between requests); appends go straight to the end of the file,
//! every other change rewrites the sheet atomically.

use anyhow::Result;
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::{debug, info};

use super::connection::{read_rows, write_atomically, CsvConnection, EXPENSE_HEADER};
use crate::domain::models::expense::DomainExpense;
use crate::storage::traits::ExpenseStorage;

#[derive(Clone)]
pub struct CsvExpenseRepository {
    connection: CsvConnection,
}

impl CsvExpenseRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_expenses(&self) -> Result<Vec<DomainExpense>> {
        self.connection.ensure_expenses_file_exists()?;
        let rows = read_rows(&self.connection.expenses_file_path(), EXPENSE_HEADER.len())?;
        Ok(rows.into_iter().map(row_to_expense).collect())
    }

    fn write_expenses(&self, expenses: &[DomainExpense]) -> Result<()> {
        let rows: Vec<Vec<String>> = expenses.iter().map(expense_to_row).collect();
        write_atomically(&self.connection.expenses_file_path(), &EXPENSE_HEADER, &rows)
    }
}

fn row_to_expense(cells: Vec<String>) -> DomainExpense {
    let mut cells = cells.into_iter();
    let mut next = || cells.next().unwrap_or_default();
    DomainExpense {
        id: next().trim().to_string(),
        vendor: next(),
        amount: next(),
        date: next(),
        method: next(),
        category: next(),
        cycle: next(),
        content: next(),
        is_deleted: parse_flag(&next()),
    }
}

fn expense_to_row(expense: &DomainExpense) -> Vec<String> {
    vec![
        expense.id.clone(),
        expense.vendor.clone(),
        expense.amount.clone(),
        expense.date.clone(),
        expense.method.clone(),
        expense.category.clone(),
        expense.cycle.clone(),
        expense.content.clone(),
        expense.is_deleted.to_string(),
    ]
}

/// Spreadsheet exports write booleans as TRUE/FALSE
fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

#[async_trait]
impl ExpenseStorage for CsvExpenseRepository {
    async fn list_all_rows(&self) -> Result<Vec<DomainExpense>> {
        self.read_expenses()
    }

    async fn list_expenses(&self) -> Result<Vec<DomainExpense>> {
        let expenses: Vec<DomainExpense> = self
            .read_expenses()?
            .into_iter()
            .filter(DomainExpense::is_active)
            .collect();
        debug!("Read {} live expense rows", expenses.len());
        Ok(expenses)
    }

    async fn get_expense(&self, id: &str) -> Result<Option<DomainExpense>> {
        Ok(self
            .read_expenses()?
            .into_iter()
            .find(|e| e.is_active() && e.id == id))
    }

    async fn store_expense(&self, expense: &DomainExpense) -> Result<()> {
        self.connection.ensure_expenses_file_exists()?;
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(self.connection.expenses_file_path())?;
        terminate_last_line(&mut file)?;
        let mut writer = ::csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(expense_to_row(expense))?;
        writer.flush()?;
        info!("Appended expense {} to sheet", expense.id);
        Ok(())
    }

    async fn update_expense(&self, expense: &DomainExpense) -> Result<bool> {
        let mut expenses = self.read_expenses()?;
        let Some(slot) = expenses.iter_mut().find(|e| e.is_active() && e.id == expense.id) else {
            return Ok(false);
        };
        *slot = expense.clone();
        self.write_expenses(&expenses)?;
        Ok(true)
    }

    async fn mark_deleted(&self, id: &str) -> Result<bool> {
        let mut expenses = self.read_expenses()?;
        let Some(slot) = expenses.iter_mut().find(|e| e.is_active() && e.id == id) else {
            return Ok(false);
        };
        slot.is_deleted = true;
        self.write_expenses(&expenses)?;
        Ok(true)
    }

    async fn replace_all_rows(&self, rows: &[DomainExpense]) -> Result<()> {
        self.write_expenses(rows)
    }
}

/// A hand-edited sheet may end without a newline; appending then would glue
/// the new row onto the last one
fn terminate_last_line(file: &mut File) -> std::io::Result<()> {
    if file.metadata()?.len() == 0 {
        return Ok(());
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        debug!("Sheet had no trailing newline, adding one before append");
        file.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{sample_expense, TestEnvironment};
    use crate::storage::Connection;
    use std::fs;

    #[tokio::test]
    async fn stores_and_lists_rows_in_sheet_order() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.connection.create_expense_repository();

        repo.store_expense(&sample_expense("a", "2024-05-10", "Cafe", "4500")).await.unwrap();
        repo.store_expense(&sample_expense("b", "2024-05-11", "Bakery", "3,000원")).await.unwrap();

        let expenses = repo.list_expenses().await.unwrap();
        let ids: Vec<&str> = expenses.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(expenses[1].amount, "3,000원");
        assert_eq!(expenses[1].amount_value(), 3000.0);
    }

    #[tokio::test]
    async fn append_after_unterminated_last_line() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.connection.create_expense_repository();
        env.connection.ensure_expenses_file_exists().unwrap();
        fs::write(
            env.connection.expenses_file_path(),
            format!("{}\na,Cafe,4500,2024-05-10,card,,,,false", EXPENSE_HEADER.join(",")),
        )
        .unwrap();

        repo.store_expense(&sample_expense("b", "2024-05-11", "Bakery", "3000")).await.unwrap();

        let expenses = repo.list_expenses().await.unwrap();
        let vendors: Vec<&str> = expenses.iter().map(|e| e.vendor.as_str()).collect();
        assert_eq!(vendors, vec!["Cafe", "Bakery"]);
        assert_eq!(expenses[0].amount, "4500");
    }

    #[tokio::test]
    async fn soft_delete_keeps_the_row() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.connection.create_expense_repository();
        repo.store_expense(&sample_expense("a", "2024-05-10", "Cafe", "4500")).await.unwrap();

        assert!(repo.mark_deleted("a").await.unwrap());
        assert!(!repo.mark_deleted("a").await.unwrap());

        assert!(repo.list_expenses().await.unwrap().is_empty());
        assert!(repo.get_expense("a").await.unwrap().is_none());

        let all = repo.list_all_rows().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_deleted);

        let raw = fs::read_to_string(env.connection.expenses_file_path()).unwrap();
        assert!(raw.contains("a,Cafe,4500,2024-05-10,card,,,,true"));
    }

    #[tokio::test]
    async fn update_replaces_only_live_row() {
        let env = TestEnvironment::new().await.unwrap();
        let repo = env.connection.create_expense_repository();
        repo.store_expense(&sample_expense("a", "2024-05-10", "Cafe", "4500")).await.unwrap();

        let mut changed = repo.get_expense("a").await.unwrap().unwrap();
        changed.vendor = "Tea House".to_string();
        assert!(repo.update_expense(&changed).await.unwrap());

        let missing = sample_expense("zzz", "2024-05-10", "Ghost", "1");
        assert!(!repo.update_expense(&missing).await.unwrap());

        let stored = repo.get_expense("a").await.unwrap().unwrap();
        assert_eq!(stored.vendor, "Tea House");
        assert_eq!(stored.amount, "4500");
    }

    #[tokio::test]
    async fn reads_hand_edited_sheet() {
        let env = TestEnvironment::new().await.unwrap();
        fs::write(
            env.connection.expenses_file_path(),
            "id,vendor,amount,date,method,category,cycle,content,isDeleted\n\
             1,Cafe,4500,2024-05-10,card,,,,FALSE\n\
             ,,,,,,,,\n\
             2,Gym,60000,2024-05-01\n\
             3,Old,100,2024-01-01,cash,,,,TRUE\n",
        )
        .unwrap();
        let repo = env.connection.create_expense_repository();

        let expenses = repo.list_expenses().await.unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[1].vendor, "Gym");
        assert_eq!(expenses[1].method, "");
        assert!(!expenses[1].is_deleted);
    }
}
