//! CSV-backed sheets

pub mod connection;
pub mod expense_repository;
pub mod payee_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use expense_repository::CsvExpenseRepository;
pub use payee_repository::CsvPayeeRepository;
