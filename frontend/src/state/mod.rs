pub mod calendar_state;
pub mod coordinator;
pub mod payee_cards;
pub mod stats_state;
