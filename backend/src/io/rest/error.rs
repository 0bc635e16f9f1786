//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use crate::domain::models::{expense::ExpenseError, payee::PayeeError};
use shared::ErrorResponse;

/// A status code plus the message placed in the `{error}` body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Login required")
    }

    fn internal(e: &anyhow::Error) -> Self {
        error!("Storage failure: {:#}", e);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

impl From<ExpenseError> for ApiError {
    fn from(e: ExpenseError) -> Self {
        match e {
            ExpenseError::MissingField(_) | ExpenseError::InvalidDate(_) => Self::bad_request(e.to_string()),
            ExpenseError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Expense not found"),
            ExpenseError::Storage(inner) => Self::internal(&inner),
        }
    }
}

impl From<PayeeError> for ApiError {
    fn from(e: PayeeError) -> Self {
        match e {
            PayeeError::MissingField(_) => Self::bad_request(e.to_string()),
            PayeeError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Payee not found"),
            PayeeError::Storage(inner) => Self::internal(&inner),
        }
    }
}
