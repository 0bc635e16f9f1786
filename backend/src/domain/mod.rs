//! # Domain Module
//!
//! Business logic for the expense tracker, independent of HTTP and of the
//! CSV storage format.
//!
//! ## Module Organization
//!
//! - **expense_service**: expense CRUD, identifier repair, search and
//!   statement CSV import/export
//! - **payee_service**: recurring payee CRUD
//! - **calendar_service**: per-day totals and next scheduled payments for a month
//! - **statistics_service**: ranked spending totals
//! - **session_service**: password login and session tokens
//! - **commands**: internal command/query types the IO layer maps onto
//! - **models**: domain entities and their error enums
//!
//! The pure calculations (sums, groupings, month arithmetic) live in
//! `shared::aggregation` so the client computes the same numbers.

pub mod calendar_service;
pub mod commands;
pub mod expense_service;
pub mod models;
pub mod payee_service;
pub mod session_service;
pub mod statistics_service;

pub use calendar_service::CalendarService;
pub use expense_service::ExpenseService;
pub use payee_service::PayeeService;
pub use session_service::SessionService;
pub use statistics_service::StatisticsService;
