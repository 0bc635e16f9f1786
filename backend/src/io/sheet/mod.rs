//! # Sheet Action Surface
//!
//! A single endpoint, `/exec`, accepting `action=read|create|update|delete`
//! as query parameters (GET) or as a form body (POST). Every call must carry
//! the shared `apiKey`. Responses are always HTTP 200 with a
//! [`shared::SheetResponse`] envelope; failures are reported through
//! `status: "error"` and a message.

pub mod sheet_apis;
