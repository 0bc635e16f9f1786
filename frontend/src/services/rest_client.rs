use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, error, info};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::dates::parse_calendar_date;
use shared::{
    AmountInput, CalendarDataResponse, CreateExpenseRequest, ErrorResponse, ExpenseResponse,
    ImportCsvResponse, LoginRequest, OkResponse, Payee, PayeeListResponse, PayeeRequest,
    PayeeResponse, StatisticsResponse, Transaction, UpdateExpenseRequest, YearMonth,
};

use super::api::{ClientError, ExpenseApi, ExpenseFields, FormField};
use super::normalize::normalize_batch;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5056";

/// API client for the REST surface.
///
/// Holds a cookie store, so a successful [`RestClient::login`] authorizes
/// every later call made through the same client.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// Create a new API client with the default base URL
    pub fn new() -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new API client with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, password: &str) -> Result<(), ClientError> {
        let request = LoginRequest {
            password: password.to_string(),
        };
        let response = self.client.post(self.url("/api/login")).json(&request).send().await?;
        decode::<OkResponse>(response).await?;
        info!("Logged in to {}", self.base_url);
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.client.post(self.url("/api/logout")).send().await?;
        decode::<OkResponse>(response).await?;
        Ok(())
    }

    pub async fn statistics(&self) -> Result<StatisticsResponse, ClientError> {
        let response = self.client.get(self.url("/api/statistics")).send().await?;
        decode(response).await
    }

    /// Vendor or payment-method search
    pub async fn search(&self, query: &str) -> Result<Vec<Transaction>, ClientError> {
        let response = self
            .client
            .get(self.url("/api/expenses/search"))
            .query(&[("q", query)])
            .send()
            .await?;
        expense_rows(decode(response).await?)
    }

    pub async fn list_payees(&self) -> Result<Vec<Payee>, ClientError> {
        let response = self.client.get(self.url("/api/payees")).send().await?;
        Ok(decode::<PayeeListResponse>(response).await?.payees)
    }

    pub async fn create_payee(&self, request: &PayeeRequest) -> Result<Payee, ClientError> {
        let response = self.client.post(self.url("/api/payees")).json(request).send().await?;
        Ok(decode::<PayeeResponse>(response).await?.payee)
    }

    pub async fn update_payee(&self, id: &str, request: &PayeeRequest) -> Result<Payee, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/api/payees/{}", id)))
            .json(request)
            .send()
            .await?;
        Ok(decode::<PayeeResponse>(response).await?.payee)
    }

    pub async fn delete_payee(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/payees/{}", id)))
            .send()
            .await?;
        decode::<OkResponse>(response).await?;
        Ok(())
    }

    /// Upload a card statement export (`학원,금액,승인 날짜,거래처,결제 주기`)
    pub async fn import_csv(&self, csv_text: String) -> Result<ImportCsvResponse, ClientError> {
        let response = self
            .client
            .post(self.url("/api/import/csv"))
            .header(reqwest::header::CONTENT_TYPE, "text/csv; charset=utf-8")
            .body(csv_text)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn export_csv(&self) -> Result<String, ClientError> {
        let response = self.client.get(self.url("/api/export/csv")).send().await?;
        let response = fail_on_error_status(response).await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ExpenseApi for RestClient {
    async fn fetch_all(&self) -> Result<Vec<Transaction>, ClientError> {
        debug!("GET /api/expenses");
        let response = self.client.get(self.url("/api/expenses")).send().await?;
        let transactions = expense_rows(decode(response).await?)?;
        info!("Loaded {} expenses", transactions.len());
        Ok(transactions)
    }

    async fn create(&self, fields: &ExpenseFields) -> Result<String, ClientError> {
        let request = create_request(fields);
        let response = self.client.post(self.url("/api/expenses")).json(&request).send().await?;
        Ok(decode::<ExpenseResponse>(response).await?.expense.id)
    }

    async fn update(&self, id: &str, fields: &ExpenseFields) -> Result<(), ClientError> {
        let request = update_request(fields);
        let response = self
            .client
            .put(self.url(&format!("/api/expenses/{}", id)))
            .json(&request)
            .send()
            .await?;
        decode::<ExpenseResponse>(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/expenses/{}", id)))
            .send()
            .await?;
        decode::<OkResponse>(response).await?;
        Ok(())
    }

    async fn next_payments(&self, month: YearMonth) -> Result<BTreeMap<NaiveDate, Vec<String>>, ClientError> {
        let response = self
            .client
            .get(self.url("/api/expenses/calendar"))
            .query(&[("year", month.year().to_string()), ("month", month.month().to_string())])
            .send()
            .await?;
        let calendar: CalendarDataResponse = decode(response).await?;

        Ok(calendar
            .daily_data
            .into_iter()
            .filter(|(_, day)| !day.next_payments.is_empty())
            .filter_map(|(key, day)| parse_calendar_date(&key).map(|date| (date, day.next_payments)))
            .collect())
    }
}

fn create_request(fields: &ExpenseFields) -> CreateExpenseRequest {
    let text = |value: &Option<String>| value.as_deref().map(str::trim).unwrap_or_default().to_string();
    CreateExpenseRequest {
        date: text(&fields.date),
        merchant: text(&fields.merchant),
        amount: AmountInput::Text(text(&fields.amount)),
        payment_method: text(&fields.payment_method),
        payment_cycle: text(&fields.payment_cycle),
        category: text(&fields.category),
        content: text(&fields.content),
    }
}

/// Only supplied, non-empty fields are sent
fn update_request(fields: &ExpenseFields) -> UpdateExpenseRequest {
    let present = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    UpdateExpenseRequest {
        date: present(&fields.date),
        merchant: present(&fields.merchant),
        amount: present(&fields.amount).map(AmountInput::Text),
        payment_method: present(&fields.payment_method),
        payment_cycle: present(&fields.payment_cycle),
        category: present(&fields.category),
        content: present(&fields.content),
    }
}

/// `{expenses: [...]}` run through the normalizer
fn expense_rows(body: Value) -> Result<Vec<Transaction>, ClientError> {
    match body.get("expenses").and_then(Value::as_array) {
        Some(rows) => Ok(normalize_batch(rows)),
        None => Err(ClientError::Transport("response has no expenses list".to_string())),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = fail_on_error_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Transport(format!("Failed to parse response: {}", e)))
}

async fn fail_on_error_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    error!("Request failed with {}: {}", status, message);
    Err(error_for_status(status, message))
}

fn error_for_status(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Auth(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST => {
            // Server validation messages lead with the field name
            let field = message.split_whitespace().next().and_then(FormField::from_wire_name);
            match field {
                Some(field) => ClientError::Validation { field, message },
                None => ClientError::Transport(message),
            }
        }
        _ => ClientError::Transport(message),
    }
}
