//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are not
//! exposed over either HTTP surface. The IO layer maps the public DTOs from
//! the `shared` crate (or raw sheet parameters) onto them.

pub mod expenses {
    /// How strictly a new expense is checked before it is written
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum EntryPolicy {
        /// REST clients: required fields must be present and the date must
        /// parse; the stored date is rewritten as `YYYY-MM-DD`.
        Strict,
        /// Sheet clients: cells are stored exactly as sent
        AsWritten,
    }

    /// Input for creating an expense
    #[derive(Debug, Clone, Default)]
    pub struct CreateExpenseCommand {
        /// Caller-chosen id; a UUID is generated when absent or blank
        pub id: Option<String>,
        pub vendor: String,
        pub amount: String,
        pub date: String,
        pub method: String,
        pub category: String,
        pub cycle: String,
        pub content: String,
    }

    /// Partial update. `None` and empty strings leave the stored cell alone.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateExpenseCommand {
        pub id: String,
        pub vendor: Option<String>,
        pub amount: Option<String>,
        pub date: Option<String>,
        pub method: Option<String>,
        pub category: Option<String>,
        pub cycle: Option<String>,
        pub content: Option<String>,
    }

    /// Outcome of a statement CSV import
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct ImportResult {
        pub inserted: usize,
        pub errors: Vec<String>,
    }
}

pub mod payees {
    #[derive(Debug, Clone, Default)]
    pub struct CreatePayeeCommand {
        pub name: String,
        pub bank_name: String,
        pub account_number: String,
        pub owner_name: String,
        pub payment_cycle: String,
        pub amount: Option<f64>,
    }

    /// Full replacement of the editable payee fields
    #[derive(Debug, Clone, Default)]
    pub struct UpdatePayeeCommand {
        pub id: String,
        pub name: String,
        pub bank_name: String,
        pub account_number: String,
        pub owner_name: String,
        pub payment_cycle: String,
        pub amount: Option<f64>,
    }
}
