use std::collections::HashMap;

use axum::{
    extract::{rejection::FormRejection, Query, State},
    response::Json,
    Form,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::domain::commands::expenses::{CreateExpenseCommand, EntryPolicy, UpdateExpenseCommand};
use crate::domain::models::expense::{DomainExpense, ExpenseError};
use crate::AppState;
use shared::sheet_messages::{
    EXPENSE_CREATED, EXPENSE_DELETED, EXPENSE_UPDATED, ID_NOT_FOUND, INVALID_API_KEY, UNKNOWN_ACTION,
};
use shared::SheetResponse;

type Params = HashMap<String, String>;

pub async fn handle_get(State(state): State<AppState>, Query(params): Query<Params>) -> Json<SheetResponse> {
    Json(dispatch(&state, params).await)
}

/// Form fields win over query parameters of the same name. A body that is
/// not a urlencoded form is ignored and the query alone is dispatched, so
/// every POST still answers with an envelope.
pub async fn handle_post(
    State(state): State<AppState>,
    Query(mut params): Query<Params>,
    form: Result<Form<Params>, FormRejection>,
) -> Json<SheetResponse> {
    match form {
        Ok(Form(form)) => params.extend(form),
        Err(rejection) => warn!("/exec ignoring POST body: {}", rejection.body_text()),
    }
    Json(dispatch(&state, params).await)
}

async fn dispatch(state: &AppState, mut params: Params) -> SheetResponse {
    let action = params.remove("action").unwrap_or_default();
    info!("/exec action={}", action);

    let api_key = params.remove("apiKey").unwrap_or_default();
    if state.settings.api_key.is_empty() || api_key != state.settings.api_key {
        warn!("/exec rejected: invalid API key");
        return SheetResponse::error(INVALID_API_KEY);
    }

    let result = match action.as_str() {
        "read" => read(state).await,
        "create" => create(state, params).await,
        "update" => update(state, params).await,
        "delete" => delete(state, params).await,
        _ => Ok(SheetResponse::error(UNKNOWN_ACTION)),
    };

    result.unwrap_or_else(|e| match e {
        ExpenseError::NotFound(_) => SheetResponse::error(ID_NOT_FOUND),
        other => {
            error!("/exec {} failed: {}", action, other);
            SheetResponse::error(other.to_string())
        }
    })
}

async fn read(state: &AppState) -> Result<SheetResponse, ExpenseError> {
    let expenses = state.expense_service.list_expenses().await?;
    Ok(SheetResponse::rows(expenses.iter().map(row_to_json).collect()))
}

async fn create(state: &AppState, mut params: Params) -> Result<SheetResponse, ExpenseError> {
    let mut take = |key: &str| params.remove(key).unwrap_or_default();
    let command = CreateExpenseCommand {
        id: Some(take("id")),
        vendor: take("vendor"),
        amount: take("amount"),
        date: take("date"),
        method: take("method"),
        category: take("category"),
        cycle: take("cycle"),
        content: take("content"),
    };
    let expense = state.expense_service.create_expense(command, EntryPolicy::AsWritten).await?;
    Ok(SheetResponse::success(EXPENSE_CREATED).with_id(expense.id))
}

async fn update(state: &AppState, mut params: Params) -> Result<SheetResponse, ExpenseError> {
    let id = params.remove("id").unwrap_or_default();
    if id.is_empty() {
        return Err(ExpenseError::NotFound(id));
    }
    let mut take = |key: &str| params.remove(key);
    let command = UpdateExpenseCommand {
        vendor: take("vendor"),
        amount: take("amount"),
        date: take("date"),
        method: take("method"),
        category: take("category"),
        cycle: take("cycle"),
        content: take("content"),
        id,
    };
    state.expense_service.update_expense(command, EntryPolicy::AsWritten).await?;
    Ok(SheetResponse::success(EXPENSE_UPDATED))
}

async fn delete(state: &AppState, params: Params) -> Result<SheetResponse, ExpenseError> {
    let id = params.get("id").cloned().unwrap_or_default();
    if id.is_empty() {
        return Err(ExpenseError::NotFound(id));
    }
    state.expense_service.delete_expense(&id).await?;
    Ok(SheetResponse::success(EXPENSE_DELETED))
}

/// One sheet row as JSON, keys in column order. Amount cells that parse are
/// sent as numbers, anything else as the raw text.
fn row_to_json(expense: &DomainExpense) -> Value {
    let amount = match expense.amount.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => json!(n),
        _ => Value::String(expense.amount.clone()),
    };
    json!({
        "id": expense.id,
        "vendor": expense.vendor,
        "amount": amount,
        "date": expense.date,
        "method": expense.method,
        "category": expense.category,
        "cycle": expense.cycle,
        "content": expense.content,
        "isDeleted": expense.is_deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_router;
    use crate::test_support::{test_state, TEST_API_KEY};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use shared::SheetStatus;
    use tower::ServiceExt;

    fn params(pairs: &[(&str, &str)]) -> Params {
        let mut params: Params = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        params.entry("apiKey".to_string()).or_insert_with(|| TEST_API_KEY.to_string());
        params
    }

    #[tokio::test]
    async fn wrong_key_is_rejected_before_action() {
        let (state, _dir) = test_state().await;
        let response = dispatch(&state, params(&[("action", "read"), ("apiKey", "bad")])).await;
        assert_eq!(response.status, SheetStatus::Error);
        assert_eq!(response.message.as_deref(), Some("Invalid API Key"));
    }

    #[tokio::test]
    async fn unknown_action() {
        let (state, _dir) = test_state().await;
        let response = dispatch(&state, params(&[("action", "truncate")])).await;
        assert_eq!(response.message.as_deref(), Some("Unknown action"));
    }

    #[tokio::test]
    async fn create_read_delete_scenario() {
        let (state, dir) = test_state().await;
        let created = dispatch(
            &state,
            params(&[
                ("action", "create"),
                ("date", "2024-05-10"),
                ("vendor", "Cafe"),
                ("amount", "4500"),
                ("method", "card"),
                ("cycle", ""),
                ("category", ""),
                ("content", ""),
            ]),
        )
        .await;
        assert_eq!(created.status, SheetStatus::Success);
        assert_eq!(created.message.as_deref(), Some("Expense created"));
        let id = created.id.unwrap();

        let read = dispatch(&state, params(&[("action", "read")])).await;
        let rows = read.data.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], id.as_str());
        assert_eq!(rows[0]["amount"], 4500.0);
        assert_eq!(rows[0]["date"], "2024-05-10");
        assert_eq!(rows[0]["isDeleted"], false);
        let keys: Vec<&String> = rows[0].as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "id");
        assert_eq!(keys[8], "isDeleted");

        let deleted = dispatch(&state, params(&[("action", "delete"), ("id", id.as_str())])).await;
        assert_eq!(deleted.status, SheetStatus::Success);

        let read = dispatch(&state, params(&[("action", "read")])).await;
        assert!(read.data.unwrap().is_empty());

        let raw = std::fs::read_to_string(dir.path().join("expenses.csv")).unwrap();
        assert!(raw.contains(&format!("{},Cafe,4500,2024-05-10,card,,,,true", id)));
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let (state, _dir) = test_state().await;
        dispatch(
            &state,
            params(&[("action", "create"), ("id", "7"), ("vendor", "Cafe"), ("amount", "4500"), ("date", "2024-05-10")]),
        )
        .await;

        let updated = dispatch(&state, params(&[("action", "update"), ("id", "7"), ("vendor", "X"), ("amount", "")])).await;
        assert_eq!(updated.status, SheetStatus::Success);

        let rows = dispatch(&state, params(&[("action", "read")])).await.data.unwrap();
        assert_eq!(rows[0]["vendor"], "X");
        assert_eq!(rows[0]["amount"], 4500.0);

        let missing = dispatch(&state, params(&[("action", "update"), ("id", "nope"), ("vendor", "Y")])).await;
        assert_eq!(missing.status, SheetStatus::Error);
        assert_eq!(missing.message.as_deref(), Some("ID not found"));

        let missing = dispatch(&state, params(&[("action", "delete"), ("id", "nope")])).await;
        assert_eq!(missing.message.as_deref(), Some("ID not found"));
    }

    #[tokio::test]
    async fn non_numeric_amount_is_sent_as_text() {
        let (state, _dir) = test_state().await;
        dispatch(
            &state,
            params(&[("action", "create"), ("vendor", "2024-03-01"), ("amount", "Cafe"), ("date", "15000")]),
        )
        .await;
        let rows = dispatch(&state, params(&[("action", "read")])).await.data.unwrap();
        assert_eq!(rows[0]["amount"], "Cafe");
        assert_eq!(rows[0]["date"], "15000");
    }

    #[tokio::test]
    async fn form_post_through_router() {
        let (state, _dir) = test_state().await;
        let app = create_router(state);

        let body = format!("action=create&apiKey={}&vendor=Cafe&amount=4500&date=2024-05-10", TEST_API_KEY);
        let response = app
            .oneshot(
                Request::post("/exec")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: SheetResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(envelope.status, SheetStatus::Success);
        assert!(envelope.id.is_some());
    }

    async fn post_envelope(uri: &str, content_type: Option<&str>, body: &str) -> SheetResponse {
        let (state, _dir) = test_state().await;
        let mut request = Request::post(uri);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let response = create_router(state)
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn post_without_form_body_uses_query() {
        let uri = format!("/exec?action=read&apiKey={}", TEST_API_KEY);
        let envelope = post_envelope(&uri, None, "").await;
        assert_eq!(envelope.status, SheetStatus::Success);
        assert_eq!(envelope.data, Some(Vec::new()));
    }

    #[tokio::test]
    async fn post_with_foreign_body_still_gets_envelope() {
        let body = format!(r#"{{"action":"read","apiKey":"{}"}}"#, TEST_API_KEY);
        let envelope = post_envelope("/exec", Some("application/json"), &body).await;
        assert_eq!(envelope.status, SheetStatus::Error);
        assert_eq!(envelope.message.as_deref(), Some(INVALID_API_KEY));
    }
}
