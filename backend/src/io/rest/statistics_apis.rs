//! # REST API for Statistics

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::info;

use super::mappers::ExpenseMapper;
use super::ApiError;
use crate::AppState;

/// Grand total plus ranked totals per merchant, method, cycle and category
pub async fn get_statistics(State(state): State<AppState>) -> Response {
    info!("GET /api/statistics");

    match state.expense_service.list_expenses().await {
        Ok(expenses) => {
            let transactions = ExpenseMapper::to_dtos(expenses);
            let response = state.statistics_service.statistics(&transactions);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
