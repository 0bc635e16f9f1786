//! # REST API for Payees

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use tracing::{error, info};

use super::mappers::PayeeMapper;
use super::ApiError;
use crate::AppState;
use shared::{OkResponse, PayeeListResponse, PayeeRequest, PayeeResponse};

/// Create a router for payee related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payees).post(create_payee))
        .route("/:id", put(update_payee).delete(delete_payee))
}

pub async fn list_payees(State(state): State<AppState>) -> Response {
    info!("GET /api/payees");

    match state.payee_service.list_payees().await {
        Ok(payees) => {
            let payees = payees.into_iter().map(PayeeMapper::to_dto).collect();
            (StatusCode::OK, Json(PayeeListResponse { payees })).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn create_payee(State(state): State<AppState>, Json(request): Json<PayeeRequest>) -> Response {
    info!("POST /api/payees - name: {}", request.name);

    match state.payee_service.create_payee(PayeeMapper::to_create_command(request)).await {
        Ok(payee) => {
            let response = PayeeResponse {
                payee: PayeeMapper::to_dto(payee),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create payee: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn update_payee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PayeeRequest>,
) -> Response {
    info!("PUT /api/payees/{}", id);

    match state.payee_service.update_payee(PayeeMapper::to_update_command(id, request)).await {
        Ok(payee) => {
            let response = PayeeResponse {
                payee: PayeeMapper::to_dto(payee),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to update payee: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Hard delete
pub async fn delete_payee(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!("DELETE /api/payees/{}", id);

    match state.payee_service.delete_payee(&id).await {
        Ok(()) => (StatusCode::OK, Json(OkResponse { ok: true })).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
