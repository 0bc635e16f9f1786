//! # REST API for Statement CSV Import/Export
//!
//! `POST /api/import/csv` takes the CSV text as the request body;
//! `GET /api/export/csv` returns the live expenses in the same layout.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tracing::info;

use super::ApiError;
use crate::AppState;
use shared::ImportCsvResponse;

pub fn import_router() -> Router<AppState> {
    Router::new().route("/csv", post(import_csv))
}

pub fn export_router() -> Router<AppState> {
    Router::new().route("/csv", get(export_csv))
}

pub async fn import_csv(State(state): State<AppState>, body: String) -> Response {
    info!("POST /api/import/csv - {} bytes", body.len());

    if body.trim().is_empty() {
        return ApiError::bad_request("CSV body is required").into_response();
    }

    match state.expense_service.import_statement_csv(&body).await {
        Ok(result) => {
            let response = ImportCsvResponse {
                inserted: result.inserted,
                errors: result.errors,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn export_csv(State(state): State<AppState>) -> Response {
    info!("GET /api/export/csv");

    match state.expense_service.export_statement_csv().await {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"expenses.csv\""),
            ],
            csv,
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
