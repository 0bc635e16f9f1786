use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::storage::traits::Connection;
use super::{CsvExpenseRepository, CsvPayeeRepository};

pub const EXPENSES_FILE: &str = "expenses.csv";
pub const PAYEES_FILE: &str = "payees.csv";

pub const EXPENSE_HEADER: [&str; 9] = [
    "id", "vendor", "amount", "date", "method", "category", "cycle", "content", "isDeleted",
];
pub const PAYEE_HEADER: [&str; 7] = [
    "ID", "name", "bank_name", "account_number", "owner_name", "payment_cycle", "amount",
];

/// CsvConnection owns the data directory and makes sure both sheets exist
#[derive(Clone, Debug)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory {}", base_path.display());
        }
        Ok(Self {
            base_directory: base_path,
        })
    }

    /// `~/Documents/Expense Tracker`
    pub fn default_directory() -> PathBuf {
        dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Expense Tracker")
    }

    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_directory())
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn expenses_file_path(&self) -> PathBuf {
        self.base_directory.join(EXPENSES_FILE)
    }

    pub fn payees_file_path(&self) -> PathBuf {
        self.base_directory.join(PAYEES_FILE)
    }

    /// Write the header row if the expense sheet does not exist yet
    pub fn ensure_expenses_file_exists(&self) -> Result<()> {
        ensure_file_with_header(&self.expenses_file_path(), &EXPENSE_HEADER)
    }

    pub fn ensure_payees_file_exists(&self) -> Result<()> {
        ensure_file_with_header(&self.payees_file_path(), &PAYEE_HEADER)
    }
}

fn ensure_file_with_header(path: &Path, header: &[&str]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        fs::write(path, format!("{}\n", header.join(",")))?;
    }
    Ok(())
}

/// Write `rows` under `header` to a temp file next to `path`, then rename it
/// over the original.
pub(crate) fn write_atomically(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    {
        let mut writer = ::csv::Writer::from_path(&temp_path)?;
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Read every data row, padding short rows with empty cells
pub(crate) fn read_rows(path: &Path, width: usize) -> Result<Vec<Vec<String>>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        cells.resize(width.max(cells.len()), String::new());
        rows.push(cells);
    }
    Ok(rows)
}

impl Connection for CsvConnection {
    type ExpenseRepository = CsvExpenseRepository;
    type PayeeRepository = CsvPayeeRepository;

    fn create_expense_repository(&self) -> Self::ExpenseRepository {
        CsvExpenseRepository::new(self.clone())
    }

    fn create_payee_repository(&self) -> Self::PayeeRepository {
        CsvPayeeRepository::new(self.clone())
    }
}
