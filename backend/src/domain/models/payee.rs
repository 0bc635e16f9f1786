use serde::{Deserialize, Serialize};

/// A recurring payment recipient, stored one per row in `payees.csv`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DomainPayee {
    pub id: String,
    pub name: String,
    pub bank_name: String,
    pub account_number: String,
    pub owner_name: String,
    pub payment_cycle: String,
    pub amount: Option<f64>,
}

impl DomainPayee {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PayeeError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Payee not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
