//! # IO Module
//!
//! Adapters between HTTP and the domain layer.
//!
//! - **rest**: JSON resources under `/api`, session-cookie authentication,
//!   domain errors translated to status codes with `{error}` bodies
//! - **sheet**: the `/exec` action endpoint, shared-key authentication,
//!   every outcome reported inside a `{status, ...}` envelope
//!
//! Neither surface contains business rules; both map their inputs onto the
//! command types in `domain::commands` and call the same services.

pub mod rest;
pub mod sheet;
