//! # REST API Interface Layer
//!
//! JSON endpoints under `/api`. Everything except login/logout sits behind
//! [`auth_apis::require_session`].
//!
//! | method | path | handler |
//! |---|---|---|
//! | POST | /login, /logout | `auth_apis` |
//! | GET, POST | /expenses | `expense_apis` |
//! | PUT, DELETE | /expenses/:id | `expense_apis` |
//! | GET | /expenses/calendar, /expenses/by-date, /expenses/search | `expense_apis` |
//! | GET, POST | /payees | `payee_apis` |
//! | PUT, DELETE | /payees/:id | `payee_apis` |
//! | GET | /statistics | `statistics_apis` |
//! | POST | /import/csv | `exchange_apis` |
//! | GET | /export/csv | `exchange_apis` |

pub mod auth_apis;
pub mod error;
pub mod exchange_apis;
pub mod expense_apis;
pub mod mappers;
pub mod payee_apis;
pub mod statistics_apis;

pub use error::ApiError;
