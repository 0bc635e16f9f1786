use crate::domain::commands::expenses::{CreateExpenseCommand, UpdateExpenseCommand};
use crate::domain::models::expense::DomainExpense;
use shared::dates::format_date;
use shared::{AmountInput, CreateExpenseRequest, Transaction, UpdateExpenseRequest};

pub struct ExpenseMapper;

impl ExpenseMapper {
    /// Convert a sheet row to the normalized DTO. Unparseable dates become
    /// empty and amounts are coerced to numbers.
    pub fn to_dto(domain: DomainExpense) -> Transaction {
        let date = domain.calendar_date().map(format_date).unwrap_or_default();
        let amount = domain.amount_value();
        Transaction {
            id: domain.id,
            date,
            merchant: domain.vendor,
            amount,
            payment_method: domain.method,
            payment_cycle: domain.cycle,
            category: domain.category,
            content: domain.content,
        }
    }

    pub fn to_dtos(domain: Vec<DomainExpense>) -> Vec<Transaction> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_create_command(request: CreateExpenseRequest) -> CreateExpenseCommand {
        CreateExpenseCommand {
            id: None,
            vendor: request.merchant,
            amount: Self::amount_cell(&request.amount),
            date: request.date,
            method: request.payment_method,
            category: request.category,
            cycle: request.payment_cycle,
            content: request.content,
        }
    }

    pub fn to_update_command(id: String, request: UpdateExpenseRequest) -> UpdateExpenseCommand {
        UpdateExpenseCommand {
            id,
            vendor: request.merchant,
            amount: request
                .amount
                .as_ref()
                .and_then(AmountInput::supplied)
                .map(|value| value.to_string()),
            date: request.date,
            method: request.payment_method,
            category: request.category,
            cycle: request.payment_cycle,
            content: request.content,
        }
    }

    /// REST amounts are stored already coerced
    fn amount_cell(amount: &AmountInput) -> String {
        amount.value().to_string()
    }
}
