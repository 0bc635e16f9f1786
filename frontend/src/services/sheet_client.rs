//! Client for the sheet `action=` surface.
//!
//! Reads are `GET ?action=read&apiKey=...`; mutations are form-encoded POSTs
//! to the same URL. Every response is a `{status, ...}` envelope, even on
//! failure, so errors are recognized by their message text.

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use shared::sheet_messages::{ID_NOT_FOUND, INVALID_API_KEY};
use shared::{SheetResponse, SheetStatus, Transaction};

use super::api::{ClientError, ExpenseApi, ExpenseFields};
use super::normalize::normalize_batch;

#[derive(Clone)]
pub struct SheetClient {
    client: Client,
    /// Full URL of the action endpoint, e.g. `http://localhost:5056/exec`
    exec_url: String,
    api_key: String,
}

impl SheetClient {
    pub fn new(exec_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), exec_url, api_key)
    }

    pub fn with_client(client: Client, exec_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            exec_url: exec_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn post_action(
        &self,
        action: &str,
        mut fields: Vec<(&'static str, String)>,
        id: Option<&str>,
    ) -> Result<SheetResponse, ClientError> {
        fields.push(("action", action.to_string()));
        fields.push(("apiKey", self.api_key.clone()));
        debug!("POST {} action={}", self.exec_url, action);

        let response = self.client.post(&self.exec_url).form(&fields).send().await?;
        let envelope = decode(response).await?;
        check(envelope, id)
    }
}

#[async_trait]
impl ExpenseApi for SheetClient {
    async fn fetch_all(&self) -> Result<Vec<Transaction>, ClientError> {
        debug!("GET {} action=read", self.exec_url);
        let response = self
            .client
            .get(&self.exec_url)
            .query(&[("action", "read"), ("apiKey", self.api_key.as_str())])
            .send()
            .await?;
        let envelope = check(decode(response).await?, None)?;

        let rows = envelope.data.unwrap_or_default();
        let transactions = normalize_batch(&rows);
        info!("Loaded {} of {} sheet rows", transactions.len(), rows.len());
        Ok(transactions)
    }

    async fn create(&self, fields: &ExpenseFields) -> Result<String, ClientError> {
        let envelope = self.post_action("create", fields.sheet_pairs(), None).await?;
        envelope
            .id
            .ok_or_else(|| ClientError::Transport("create response carried no id".to_string()))
    }

    async fn update(&self, id: &str, fields: &ExpenseFields) -> Result<(), ClientError> {
        let mut pairs = fields.sheet_pairs();
        pairs.push(("id", id.to_string()));
        self.post_action("update", pairs, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.post_action("delete", vec![("id", id.to_string())], Some(id))
            .await?;
        Ok(())
    }
}

async fn decode(response: reqwest::Response) -> Result<SheetResponse, ClientError> {
    let status = response.status();
    if !status.is_success() {
        error!("Sheet endpoint answered {}", status);
        return Err(ClientError::Transport(format!("HTTP {}", status)));
    }
    response
        .json::<SheetResponse>()
        .await
        .map_err(|e| ClientError::Transport(format!("Failed to parse sheet response: {}", e)))
}

/// Turn an error envelope into the matching [`ClientError`]
fn check(envelope: SheetResponse, id: Option<&str>) -> Result<SheetResponse, ClientError> {
    if envelope.status == SheetStatus::Success {
        return Ok(envelope);
    }
    let message = envelope.message.unwrap_or_default();
    error!("Sheet request failed: {}", message);
    Err(match message.as_str() {
        INVALID_API_KEY => ClientError::Auth(message),
        ID_NOT_FOUND => ClientError::NotFound(id.unwrap_or_default().to_string()),
        _ => ClientError::Transport(message),
    })
}
