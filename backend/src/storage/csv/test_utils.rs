//! RAII test environment for CSV-backed tests.
//!
//! The temporary directory lives as long as the `TestEnvironment`, so test
//! data is removed even when a test panics.

use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::CsvConnection;
use crate::domain::models::{expense::DomainExpense, payee::DomainPayee};

pub struct TestEnvironment {
    _temp_dir: TempDir,
    pub connection: CsvConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path)?;
        Ok(Self {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }
}

pub fn sample_expense(id: &str, date: &str, vendor: &str, amount: &str) -> DomainExpense {
    DomainExpense {
        id: id.to_string(),
        vendor: vendor.to_string(),
        amount: amount.to_string(),
        date: date.to_string(),
        method: "card".to_string(),
        ..Default::default()
    }
}

pub fn sample_payee(id: &str, name: &str, cycle: &str) -> DomainPayee {
    DomainPayee {
        id: id.to_string(),
        name: name.to_string(),
        bank_name: "Shinhan".to_string(),
        account_number: "110-123-456789".to_string(),
        owner_name: "김현아".to_string(),
        payment_cycle: cycle.to_string(),
        amount: None,
    }
}
