use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::connection::{read_rows, write_atomically, CsvConnection, PAYEE_HEADER};
use crate::domain::models::payee::DomainPayee;
use crate::storage::traits::PayeeStorage;

/// CSV-backed payee sheet; every write rewrites the file
#[derive(Clone)]
pub struct CsvPayeeRepository {
    connection: CsvConnection,
}

impl CsvPayeeRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_payees(&self) -> Result<Vec<DomainPayee>> {
        self.connection.ensure_payees_file_exists()?;
        let rows = read_rows(&self.connection.payees_file_path(), PAYEE_HEADER.len())?;
        Ok(rows
            .into_iter()
            .map(|cells| DomainPayee {
                id: cells[0].trim().to_string(),
                name: cells[1].clone(),
                bank_name: cells[2].clone(),
                account_number: cells[3].clone(),
                owner_name: cells[4].clone(),
                payment_cycle: cells[5].clone(),
                amount: cells[6].trim().parse::<f64>().ok(),
            })
            .collect())
    }

    fn write_payees(&self, payees: &[DomainPayee]) -> Result<()> {
        let rows: Vec<Vec<String>> = payees
            .iter()
            .map(|p| {
                vec![
                    p.id.clone(),
                    p.name.clone(),
                    p.bank_name.clone(),
                    p.account_number.clone(),
                    p.owner_name.clone(),
                    p.payment_cycle.clone(),
                    p.amount.map(|a| a.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        write_atomically(&self.connection.payees_file_path(), &PAYEE_HEADER, &rows)
    }
}

#[async_trait]
impl PayeeStorage for CsvPayeeRepository {
    async fn list_payees(&self) -> Result<Vec<DomainPayee>> {
        let mut payees = self.read_payees()?;
        payees.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(payees)
    }

    async fn get_payee(&self, id: &str) -> Result<Option<DomainPayee>> {
        Ok(self.read_payees()?.into_iter().find(|p| p.id == id))
    }

    async fn store_payee(&self, payee: &DomainPayee) -> Result<()> {
        let mut payees = self.read_payees()?;
        payees.push(payee.clone());
        self.write_payees(&payees)?;
        info!("Stored payee {} ({})", payee.name, payee.id);
        Ok(())
    }

    async fn update_payee(&self, payee: &DomainPayee) -> Result<bool> {
        let mut payees = self.read_payees()?;
        let Some(slot) = payees.iter_mut().find(|p| p.id == payee.id) else {
            return Ok(false);
        };
        *slot = payee.clone();
        self.write_payees(&payees)?;
        Ok(true)
    }

    async fn delete_payee(&self, id: &str) -> Result<bool> {
        let mut payees = self.read_payees()?;
        let before = payees.len();
        payees.retain(|p| p.id != id);
        if payees.len() == before {
            return Ok(false);
        }
        self.write_payees(&payees)?;
        Ok(true)
    }
}
