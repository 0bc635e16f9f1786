//! # Expense Tracker Client Core
//!
//! Everything the expense tracker's screens need short of drawing pixels:
//!
//! - [`services`]: HTTP clients for the sheet and REST surfaces, the record
//!   normalizer that turns loosely typed rows into [`shared::Transaction`]s,
//!   and display masking for payee details.
//! - [`state`]: the calendar and statistics view models and the
//!   [`state::coordinator::ExpenseCoordinator`] that owns the loaded
//!   transactions and routes UI commands to the API.
//!
//! Rendering is left to whatever toolkit hosts these types; charts are drawn
//! through the [`state::stats_state::ChartSurface`] trait.

pub mod services;
pub mod state;

pub use services::api::{ClientError, ExpenseApi, ExpenseFields, FormField};
pub use services::rest_client::RestClient;
pub use services::sheet_client::SheetClient;
pub use state::coordinator::{ExpenseCoordinator, ExpenseForm, UiCommand};
