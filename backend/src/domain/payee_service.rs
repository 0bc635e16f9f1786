//! Payee management.
//!
//! Payees are the recipients of recurring payments. Their cycle overrides the
//! cycle recorded on individual expenses when the calendar schedules the next
//! payment. Unlike expenses, payees are hard-deleted.

use std::sync::Arc;

use tracing::info;

use crate::domain::commands::payees::{CreatePayeeCommand, UpdatePayeeCommand};
use crate::domain::models::payee::{DomainPayee, PayeeError};
use crate::storage::{Connection, PayeeStorage, WriteLock};

#[derive(Clone)]
pub struct PayeeService<C: Connection> {
    payee_repository: Arc<C::PayeeRepository>,
    write_lock: WriteLock,
}

impl<C: Connection> PayeeService<C> {
    pub fn new(connection: Arc<C>, write_lock: WriteLock) -> Self {
        Self {
            payee_repository: Arc::new(connection.create_payee_repository()),
            write_lock,
        }
    }

    /// All payees ordered by name
    pub async fn list_payees(&self) -> Result<Vec<DomainPayee>, PayeeError> {
        Ok(self.payee_repository.list_payees().await?)
    }

    pub async fn create_payee(&self, command: CreatePayeeCommand) -> Result<DomainPayee, PayeeError> {
        validate(&command.name, &command.owner_name, &command.payment_cycle)?;

        let payee = DomainPayee {
            id: DomainPayee::generate_id(),
            name: command.name.trim().to_string(),
            bank_name: command.bank_name.trim().to_string(),
            account_number: command.account_number.trim().to_string(),
            owner_name: command.owner_name.trim().to_string(),
            payment_cycle: command.payment_cycle.trim().to_string(),
            amount: command.amount,
        };

        let _guard = self.write_lock.acquire("create payee").await;
        self.payee_repository.store_payee(&payee).await?;
        info!("Created payee {}", payee.name);
        Ok(payee)
    }

    pub async fn update_payee(&self, command: UpdatePayeeCommand) -> Result<DomainPayee, PayeeError> {
        validate(&command.name, &command.owner_name, &command.payment_cycle)?;

        let payee = DomainPayee {
            id: command.id.clone(),
            name: command.name.trim().to_string(),
            bank_name: command.bank_name.trim().to_string(),
            account_number: command.account_number.trim().to_string(),
            owner_name: command.owner_name.trim().to_string(),
            payment_cycle: command.payment_cycle.trim().to_string(),
            amount: command.amount,
        };

        let _guard = self.write_lock.acquire("update payee").await;
        if !self.payee_repository.update_payee(&payee).await? {
            return Err(PayeeError::NotFound(command.id));
        }
        Ok(payee)
    }

    pub async fn delete_payee(&self, id: &str) -> Result<(), PayeeError> {
        let _guard = self.write_lock.acquire("delete payee").await;
        if !self.payee_repository.delete_payee(id).await? {
            return Err(PayeeError::NotFound(id.to_string()));
        }
        info!("Deleted payee {}", id);
        Ok(())
    }
}

fn validate(name: &str, owner_name: &str, payment_cycle: &str) -> Result<(), PayeeError> {
    if name.trim().is_empty() {
        return Err(PayeeError::MissingField("name"));
    }
    if owner_name.trim().is_empty() {
        return Err(PayeeError::MissingField("owner_name"));
    }
    if payment_cycle.trim().is_empty() {
        return Err(PayeeError::MissingField("payment_cycle"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::CsvConnection;

    fn piano() -> CreatePayeeCommand {
        CreatePayeeCommand {
            name: "Piano Academy".to_string(),
            bank_name: "Shinhan".to_string(),
            account_number: "110-123-456789".to_string(),
            owner_name: "김현아".to_string(),
            payment_cycle: "1M".to_string(),
            amount: Some(150000.0),
        }
    }

    async fn setup() -> (PayeeService<CsvConnection>, TestEnvironment) {
        let env = TestEnvironment::new().await.unwrap();
        let service = PayeeService::new(Arc::new(env.connection.clone()), WriteLock::default());
        (service, env)
    }

    #[tokio::test]
    async fn create_requires_name_owner_and_cycle() {
        let (service, _env) = setup().await;
        let mut command = piano();
        command.owner_name = " ".to_string();
        assert!(matches!(
            service.create_payee(command).await,
            Err(PayeeError::MissingField("owner_name"))
        ));
        assert!(service.list_payees().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_lifecycle() {
        let (service, _env) = setup().await;
        let created = service.create_payee(piano()).await.unwrap();

        let updated = service
            .update_payee(UpdatePayeeCommand {
                id: created.id.clone(),
                name: "Piano Academy".to_string(),
                owner_name: "김현아".to_string(),
                payment_cycle: "3M".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.payment_cycle, "3M");
        assert_eq!(updated.bank_name, "");

        service.delete_payee(&created.id).await.unwrap();
        assert!(matches!(
            service.delete_payee(&created.id).await,
            Err(PayeeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_unknown_payee_is_not_found() {
        let (service, _env) = setup().await;
        let result = service
            .update_payee(UpdatePayeeCommand {
                id: "nope".to_string(),
                name: "A".to_string(),
                owner_name: "B".to_string(),
                payment_cycle: "1M".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(PayeeError::NotFound(_))));
    }
}
