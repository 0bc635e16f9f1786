pub mod expense;
pub mod payee;
