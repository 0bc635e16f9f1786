pub mod expense_mapper;
pub mod payee_mapper;

pub use expense_mapper::ExpenseMapper;
pub use payee_mapper::PayeeMapper;
