use crate::domain::commands::payees::{CreatePayeeCommand, UpdatePayeeCommand};
use crate::domain::models::payee::DomainPayee;
use shared::{Payee, PayeeRequest};

pub struct PayeeMapper;

impl PayeeMapper {
    pub fn to_dto(domain: DomainPayee) -> Payee {
        Payee {
            id: domain.id,
            name: domain.name,
            bank_name: domain.bank_name,
            account_number: domain.account_number,
            owner_name: domain.owner_name,
            payment_cycle: domain.payment_cycle,
            amount: domain.amount,
        }
    }

    pub fn to_create_command(request: PayeeRequest) -> CreatePayeeCommand {
        CreatePayeeCommand {
            name: request.name,
            bank_name: request.bank_name,
            account_number: request.account_number,
            owner_name: request.owner_name,
            payment_cycle: request.payment_cycle,
            amount: request.amount.map(|a| a.value()),
        }
    }

    pub fn to_update_command(id: String, request: PayeeRequest) -> UpdatePayeeCommand {
        UpdatePayeeCommand {
            id,
            name: request.name,
            bank_name: request.bank_name,
            account_number: request.account_number,
            owner_name: request.owner_name,
            payment_cycle: request.payment_cycle,
            amount: request.amount.map(|a| a.value()),
        }
    }
}
