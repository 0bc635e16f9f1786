//! # REST API for Expenses
//!
//! CRUD plus the calendar, by-date and search views over the expense sheet.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use tracing::{error, info};

use super::mappers::ExpenseMapper;
use super::ApiError;
use crate::domain::commands::expenses::EntryPolicy;
use crate::AppState;
use shared::aggregation::{sort_by_date_desc, transactions_on};
use shared::dates::{parse_calendar_date, today};
use shared::{
    CreateExpenseRequest, ExpenseListResponse, ExpenseResponse, OkResponse, UpdateExpenseRequest,
    YearMonth,
};

/// Create a router for expense related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/calendar", get(get_calendar_data))
        .route("/by-date", get(get_expenses_by_date))
        .route("/search", get(search_expenses))
        .route("/:id", put(update_expense).delete(delete_expense))
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ByDateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// All live expenses, newest first
pub async fn list_expenses(State(state): State<AppState>) -> Response {
    info!("GET /api/expenses");

    match state.expense_service.list_expenses().await {
        Ok(expenses) => {
            let mut expenses = ExpenseMapper::to_dtos(expenses);
            sort_by_date_desc(&mut expenses);
            (StatusCode::OK, Json(ExpenseListResponse { expenses })).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn create_expense(
    State(state): State<AppState>,
    Json(request): Json<CreateExpenseRequest>,
) -> Response {
    info!("POST /api/expenses - request: {:?}", request);

    let command = ExpenseMapper::to_create_command(request);
    match state.expense_service.create_expense(command, EntryPolicy::Strict).await {
        Ok(expense) => {
            let response = ExpenseResponse {
                expense: ExpenseMapper::to_dto(expense),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create expense: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateExpenseRequest>,
) -> Response {
    info!("PUT /api/expenses/{} - request: {:?}", id, request);

    let command = ExpenseMapper::to_update_command(id, request);
    match state.expense_service.update_expense(command, EntryPolicy::Strict).await {
        Ok(expense) => {
            let response = ExpenseResponse {
                expense: ExpenseMapper::to_dto(expense),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to update expense: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Soft delete
pub async fn delete_expense(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("DELETE /api/expenses/{}", id);

    match state.expense_service.delete_expense(&id).await {
        Ok(()) => (StatusCode::OK, Json(OkResponse { ok: true })).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Per-day totals and next scheduled payments for one month
pub async fn get_calendar_data(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Response {
    info!("GET /api/expenses/calendar - query: {:?}", query);

    let year = query.year.as_deref().and_then(|y| y.trim().parse::<i32>().ok());
    let month = query.month.as_deref().and_then(|m| m.trim().parse::<u32>().ok());
    let Some(month) = year.zip(month).and_then(|(y, m)| YearMonth::new(y, m)) else {
        return ApiError::bad_request("year and month are required").into_response();
    };

    let expenses = match state.expense_service.list_expenses().await {
        Ok(expenses) => ExpenseMapper::to_dtos(expenses),
        Err(e) => return ApiError::from(e).into_response(),
    };
    let payees = match state.payee_service.list_payees().await {
        Ok(payees) => payees,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let response = state
        .calendar_service
        .calendar_month(month, &expenses, &payees, today());
    (StatusCode::OK, Json(response)).into_response()
}

/// Expenses on one day, newest id first
pub async fn get_expenses_by_date(
    State(state): State<AppState>,
    Query(query): Query<ByDateQuery>,
) -> Response {
    info!("GET /api/expenses/by-date - query: {:?}", query);

    let Some(day) = query.date.as_deref().and_then(parse_calendar_date) else {
        return ApiError::bad_request("date is required").into_response();
    };

    match state.expense_service.list_expenses().await {
        Ok(expenses) => {
            let expenses = ExpenseMapper::to_dtos(expenses);
            let expenses = transactions_on(&expenses, day).into_iter().cloned().collect();
            (StatusCode::OK, Json(ExpenseListResponse { expenses })).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Vendor or payment-method substring search; an empty query finds nothing
pub async fn search_expenses(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    info!("GET /api/expenses/search - query: {:?}", query);

    let q = query.q.unwrap_or_default();
    if q.trim().is_empty() {
        return (StatusCode::OK, Json(ExpenseListResponse { expenses: Vec::new() })).into_response();
    }

    match state.expense_service.search_expenses(&q).await {
        Ok(expenses) => {
            let expenses = ExpenseMapper::to_dtos(expenses);
            (StatusCode::OK, Json(ExpenseListResponse { expenses })).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
