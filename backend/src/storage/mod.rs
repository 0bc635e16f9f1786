//! # Storage Module
//!
//! Persistence for the expense tracker.
//!
//! The persisted form is a pair of CSV "sheets" in the data directory:
//!
//! - `expenses.csv`: the expense sheet, nine ordered columns
//!   (id, vendor, amount, date, method, category, cycle, content, isDeleted).
//!   Rows are never removed; deletion flips `isDeleted`.
//! - `payees.csv`: recurring payment recipients, hard-deleted.
//!
//! The domain layer only sees the [`ExpenseStorage`] / [`PayeeStorage`]
//! traits, obtained from a [`Connection`]. Every rewrite of a sheet goes
//! through a temp file followed by a rename so a crash never leaves a
//! half-written file behind. Cross-request serialization of writes is the job
//! of [`WriteLock`], which the services hold around each mutation.

pub mod csv;
pub mod lock;
pub mod traits;

pub use self::csv::CsvConnection;
pub use lock::{WriteGuard, WriteLock};
pub use traits::*;
