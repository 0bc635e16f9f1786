//! # Storage Traits
//!
//! Abstractions the domain layer uses so the CSV sheets can be swapped for
//! another backend (or an in-memory fake) without touching the services.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{expense::DomainExpense, payee::DomainPayee};

/// Access to the expense sheet
#[async_trait]
pub trait ExpenseStorage: Send + Sync {
    /// Every row in sheet order, including soft-deleted ones
    async fn list_all_rows(&self) -> Result<Vec<DomainExpense>>;

    /// Rows that have not been soft-deleted, in sheet order
    async fn list_expenses(&self) -> Result<Vec<DomainExpense>>;

    /// Find a live row by id
    async fn get_expense(&self, id: &str) -> Result<Option<DomainExpense>>;

    /// Append a new row at the bottom of the sheet
    async fn store_expense(&self, expense: &DomainExpense) -> Result<()>;

    /// Replace the live row with the same id.
    /// Returns false if no such row exists.
    async fn update_expense(&self, expense: &DomainExpense) -> Result<bool>;

    /// Set the deleted flag on the live row with this id.
    /// Returns false if no such row exists.
    async fn mark_deleted(&self, id: &str) -> Result<bool>;

    /// Overwrite the whole sheet, keeping row order
    async fn replace_all_rows(&self, rows: &[DomainExpense]) -> Result<()>;
}

/// Access to the payee sheet
#[async_trait]
pub trait PayeeStorage: Send + Sync {
    /// All payees ordered by name
    async fn list_payees(&self) -> Result<Vec<DomainPayee>>;

    async fn get_payee(&self, id: &str) -> Result<Option<DomainPayee>>;

    async fn store_payee(&self, payee: &DomainPayee) -> Result<()>;

    /// Returns false if the payee does not exist
    async fn update_payee(&self, payee: &DomainPayee) -> Result<bool>;

    /// Removes the row entirely. Returns false if the payee does not exist
    async fn delete_payee(&self, id: &str) -> Result<bool>;
}

/// Factory for repositories that share one underlying store
pub trait Connection: Send + Sync + Clone + 'static {
    type ExpenseRepository: ExpenseStorage;
    type PayeeRepository: PayeeStorage;

    fn create_expense_repository(&self) -> Self::ExpenseRepository;

    fn create_payee_repository(&self) -> Self::PayeeRepository;
}
