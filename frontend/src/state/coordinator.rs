//! CRUD coordinator.
//!
//! Owns the loaded transactions, the calendar cursor and the edit/delete
//! dialogs. Screens send [`UiCommand`]s through [`ExpenseCoordinator::handle`]
//! and read back whatever they need to draw. Every successful mutation is
//! followed by a full reload; nothing is patched locally.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{error, info};
use shared::aggregation::{latest_date, transactions_on};
use shared::dates::parse_calendar_date;
use shared::{Transaction, YearMonth, UNCATEGORIZED};

use super::calendar_state::{CalendarGrid, CalendarState};
use super::stats_state::StatisticsView;
use crate::services::api::{ClientError, ExpenseApi, ExpenseFields, FormField};

/// Values typed into the expense dialog. `id` is set when editing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseForm {
    pub id: Option<String>,
    pub date: String,
    pub merchant: String,
    pub amount: String,
    pub payment_method: String,
    pub payment_cycle: String,
    pub category: String,
    pub content: String,
}

impl ExpenseForm {
    /// The normalizer's display category is not data, so it edits as blank
    pub fn from_transaction(transaction: &Transaction) -> Self {
        let category = match transaction.category.as_str() {
            UNCATEGORIZED => String::new(),
            other => other.to_string(),
        };
        Self {
            id: Some(transaction.id.clone()),
            date: transaction.date.clone(),
            merchant: transaction.merchant.clone(),
            amount: transaction.amount.to_string(),
            payment_method: transaction.payment_method.clone(),
            payment_cycle: transaction.payment_cycle.clone(),
            category,
            content: transaction.content.clone(),
        }
    }

    /// Merchant, date, payment method and cycle are required
    pub fn validate(&self) -> Result<(), ClientError> {
        let required = [
            (FormField::Merchant, &self.merchant),
            (FormField::Date, &self.date),
            (FormField::PaymentMethod, &self.payment_method),
            (FormField::PaymentCycle, &self.payment_cycle),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ClientError::validation(field, format!("{} is required", field)));
            }
        }
        if parse_calendar_date(&self.date).is_none() {
            return Err(ClientError::validation(
                FormField::Date,
                format!("{} is not a date", self.date.trim()),
            ));
        }
        Ok(())
    }

    pub fn to_fields(&self) -> ExpenseFields {
        let some = |value: &String| Some(value.trim().to_string());
        ExpenseFields {
            date: some(&self.date),
            merchant: some(&self.merchant),
            amount: some(&self.amount),
            payment_method: some(&self.payment_method),
            payment_cycle: some(&self.payment_cycle),
            category: some(&self.category),
            content: some(&self.content),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    PrevMonth,
    NextMonth,
    SelectDate(NaiveDate),
    /// Open the dialog for a new expense, prefilled with the selected day
    NewExpense,
    EditExpense(String),
    CloseEditor,
    RequestDelete(String),
    ConfirmDelete,
    CancelDelete,
    Submit(ExpenseForm),
    Reload,
}

pub struct ExpenseCoordinator<A: ExpenseApi> {
    api: A,
    today: NaiveDate,
    transactions: Vec<Transaction>,
    calendar: CalendarState,
    next_payments: BTreeMap<NaiveDate, Vec<String>>,
    editing: Option<ExpenseForm>,
    pending_delete: Option<String>,
    saving: bool,
    last_error: Option<ClientError>,
}

impl<A: ExpenseApi> ExpenseCoordinator<A> {
    pub fn new(api: A, today: NaiveDate) -> Self {
        Self {
            api,
            today,
            transactions: Vec::new(),
            calendar: CalendarState::new(YearMonth::of(today)),
            next_payments: BTreeMap::new(),
            editing: None,
            pending_delete: None,
            saving: false,
            last_error: None,
        }
    }

    /// First load: fetch everything and jump to the month of the newest expense
    pub async fn load_initial(&mut self) -> Result<(), ClientError> {
        self.transactions = self.api.fetch_all().await?;
        if let Some(latest) = latest_date(&self.transactions) {
            self.calendar.jump_to(YearMonth::of(latest));
        }
        self.refresh_next_payments().await
    }

    /// Replace the loaded set and calendar annotations, keeping the cursor
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        self.transactions = self.api.fetch_all().await?;
        info!("Reloaded {} expenses", self.transactions.len());
        self.refresh_next_payments().await
    }

    async fn refresh_next_payments(&mut self) -> Result<(), ClientError> {
        self.next_payments = self.api.next_payments(self.calendar.current_month()).await?;
        Ok(())
    }

    pub async fn create(&mut self, form: ExpenseForm) -> Result<String, ClientError> {
        form.validate()?;

        self.saving = true;
        let result = self.api.create(&form.to_fields()).await;
        self.saving = false;

        let id = result?;
        info!("Created expense {}", id);
        self.editing = None;
        self.reload().await?;
        Ok(id)
    }

    pub async fn update(&mut self, form: ExpenseForm) -> Result<(), ClientError> {
        let id = match form.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(ClientError::NotFound("expense without id".to_string())),
        };
        form.validate()?;

        self.saving = true;
        let result = self.api.update(&id, &form.to_fields()).await;
        self.saving = false;

        result?;
        info!("Updated expense {}", id);
        self.editing = None;
        self.reload().await
    }

    /// First step of deleting: remember what to delete
    pub fn request_delete(&mut self, id: impl Into<String>) {
        self.pending_delete = Some(id.into());
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Second step. Returns `false` when nothing was pending.
    pub async fn confirm_delete(&mut self) -> Result<bool, ClientError> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(false);
        };

        self.saving = true;
        let result = self.api.delete(&id).await;
        self.saving = false;

        result?;
        info!("Deleted expense {}", id);
        self.reload().await?;
        Ok(true)
    }

    pub async fn handle(&mut self, command: UiCommand) -> Result<(), ClientError> {
        let result = match command {
            UiCommand::PrevMonth => self.move_month(-1).await,
            UiCommand::NextMonth => self.move_month(1).await,
            UiCommand::SelectDate(date) => {
                self.calendar.select_date(date);
                Ok(())
            }
            UiCommand::NewExpense => {
                let date = self.calendar.selected_date().unwrap_or(self.today);
                self.editing = Some(ExpenseForm {
                    date: date.format("%Y-%m-%d").to_string(),
                    ..Default::default()
                });
                Ok(())
            }
            UiCommand::EditExpense(id) => match self.transactions.iter().find(|t| t.id == id) {
                Some(transaction) => {
                    self.editing = Some(ExpenseForm::from_transaction(transaction));
                    Ok(())
                }
                None => Err(ClientError::NotFound(id)),
            },
            UiCommand::CloseEditor => {
                self.editing = None;
                Ok(())
            }
            UiCommand::RequestDelete(id) => {
                self.request_delete(id);
                Ok(())
            }
            UiCommand::ConfirmDelete => self.confirm_delete().await.map(|_| ()),
            UiCommand::CancelDelete => {
                self.cancel_delete();
                Ok(())
            }
            UiCommand::Submit(form) => {
                if form.id.is_some() {
                    self.update(form).await
                } else {
                    self.create(form).await.map(|_| ())
                }
            }
            UiCommand::Reload => self.reload().await,
        };

        match &result {
            Ok(()) => self.last_error = None,
            Err(e) => {
                error!("Command failed: {}", e);
                self.last_error = Some(e.clone());
            }
        }
        result
    }

    async fn move_month(&mut self, delta: i32) -> Result<(), ClientError> {
        self.calendar.advance_month(delta);
        self.refresh_next_payments().await
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn calendar(&self) -> &CalendarState {
        &self.calendar
    }

    pub fn calendar_grid(&self) -> CalendarGrid {
        self.calendar.build_grid(&self.transactions, &self.next_payments, self.today)
    }

    /// Expenses on the selected day, newest id first
    pub fn selected_day_transactions(&self) -> Vec<&Transaction> {
        match self.calendar.selected_date() {
            Some(day) => transactions_on(&self.transactions, day),
            None => Vec::new(),
        }
    }

    pub fn statistics(&self) -> StatisticsView {
        StatisticsView::build(&self.transactions, self.today)
    }

    pub fn editing(&self) -> Option<&ExpenseForm> {
        self.editing.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// In-memory backend that counts calls and can be told to fail
    #[derive(Default)]
    struct FakeApi {
        rows: Mutex<Vec<Transaction>>,
        calls: Mutex<Vec<String>>,
        fail_mutations: Mutex<Option<ClientError>>,
        last_update: Mutex<Option<ExpenseFields>>,
    }

    impl FakeApi {
        fn with_rows(rows: Vec<Transaction>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Default::default()
            }
        }

        fn record(&self, call: &str) -> Result<(), ClientError> {
            self.calls.lock().unwrap().push(call.to_string());
            match self.fail_mutations.lock().unwrap().clone() {
                Some(e) if call != "fetch_all" && call != "next_payments" => Err(e),
                _ => Ok(()),
            }
        }

        fn call_count(&self, call: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| c.as_str() == call).count()
        }
    }

    #[async_trait]
    impl ExpenseApi for FakeApi {
        async fn fetch_all(&self) -> Result<Vec<Transaction>, ClientError> {
            self.record("fetch_all")?;
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn create(&self, fields: &ExpenseFields) -> Result<String, ClientError> {
            self.record("create")?;
            let mut rows = self.rows.lock().unwrap();
            let id = (rows.len() + 1).to_string();
            rows.push(Transaction {
                id: id.clone(),
                date: fields.date.clone().unwrap_or_default(),
                merchant: fields.merchant.clone().unwrap_or_default(),
                amount: fields.amount.as_deref().map(shared::coerce_amount).unwrap_or(0.0),
                payment_method: fields.payment_method.clone().unwrap_or_default(),
                payment_cycle: fields.payment_cycle.clone().unwrap_or_default(),
                category: fields.category.clone().unwrap_or_default(),
                content: fields.content.clone().unwrap_or_default(),
            });
            Ok(id)
        }

        async fn update(&self, id: &str, fields: &ExpenseFields) -> Result<(), ClientError> {
            self.record("update")?;
            *self.last_update.lock().unwrap() = Some(fields.clone());
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ClientError::NotFound(id.to_string()))?;
            if let Some(merchant) = &fields.merchant {
                row.merchant = merchant.clone();
            }
            Ok(())
        }

        async fn delete(&self, id: &str) -> Result<(), ClientError> {
            self.record("delete")?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|t| t.id != id);
            if rows.len() == before {
                return Err(ClientError::NotFound(id.to_string()));
            }
            Ok(())
        }

        async fn next_payments(&self, month: YearMonth) -> Result<BTreeMap<NaiveDate, Vec<String>>, ClientError> {
            self.record("next_payments")?;
            let mut payments = BTreeMap::new();
            if month == YearMonth::new(2024, 6).unwrap() {
                payments.insert(ymd(2024, 6, 10), vec!["Piano".to_string()]);
            }
            Ok(payments)
        }
    }

    fn spend(id: &str, date: &str, merchant: &str, amount: f64) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: date.to_string(),
            merchant: merchant.to_string(),
            amount,
            payment_method: "card".to_string(),
            payment_cycle: "1M".to_string(),
            category: String::new(),
            content: String::new(),
        }
    }

    fn valid_form() -> ExpenseForm {
        ExpenseForm {
            date: "2024-05-20".to_string(),
            merchant: "Bakery".to_string(),
            amount: "3,000".to_string(),
            payment_method: "cash".to_string(),
            payment_cycle: "1M".to_string(),
            ..Default::default()
        }
    }

    async fn loaded() -> ExpenseCoordinator<FakeApi> {
        let api = FakeApi::with_rows(vec![
            spend("1", "2024-03-02", "Cafe", 4500.0),
            spend("2", "2024-05-10", "Piano", 150000.0),
        ]);
        let mut coordinator = ExpenseCoordinator::new(api, ymd(2024, 9, 1));
        coordinator.load_initial().await.unwrap();
        coordinator
    }

    #[tokio::test]
    async fn initial_load_jumps_to_latest_month() {
        let coordinator = loaded().await;
        assert_eq!(coordinator.calendar().current_month(), YearMonth::new(2024, 5).unwrap());
        assert_eq!(coordinator.transactions().len(), 2);
        assert_eq!(coordinator.calendar_grid().monthly_total, 150000.0);
    }

    #[tokio::test]
    async fn navigation_keeps_cursor_across_reloads() {
        let mut coordinator = loaded().await;
        coordinator.handle(UiCommand::NextMonth).await.unwrap();
        assert_eq!(coordinator.calendar().current_month(), YearMonth::new(2024, 6).unwrap());
        assert!(coordinator
            .calendar_grid()
            .cells
            .iter()
            .any(|c| c.date == ymd(2024, 6, 10) && c.badge.is_some()));

        coordinator.handle(UiCommand::Reload).await.unwrap();
        assert_eq!(coordinator.calendar().current_month(), YearMonth::new(2024, 6).unwrap());
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_api() {
        let mut coordinator = loaded().await;
        let mut form = valid_form();
        form.payment_cycle = " ".to_string();

        let result = coordinator.handle(UiCommand::Submit(form)).await;
        assert!(matches!(
            result,
            Err(ClientError::Validation {
                field: FormField::PaymentCycle,
                ..
            })
        ));
        assert_eq!(coordinator.api.call_count("create"), 0);
        assert!(coordinator.last_error().is_some());
    }

    #[tokio::test]
    async fn create_reloads_everything() {
        let mut coordinator = loaded().await;
        let fetches = coordinator.api.call_count("fetch_all");

        coordinator.handle(UiCommand::SelectDate(ymd(2024, 5, 20))).await.unwrap();
        coordinator.handle(UiCommand::Submit(valid_form())).await.unwrap();

        assert_eq!(coordinator.api.call_count("fetch_all"), fetches + 1);
        assert_eq!(coordinator.transactions().len(), 3);
        assert!(!coordinator.is_saving());
        let selected: Vec<&str> = coordinator
            .selected_day_transactions()
            .iter()
            .map(|t| t.merchant.as_str())
            .collect();
        assert_eq!(selected, vec!["Bakery"]);
    }

    #[tokio::test]
    async fn failed_mutation_clears_saving_flag() {
        let mut coordinator = loaded().await;
        *coordinator.api.fail_mutations.lock().unwrap() = Some(ClientError::Transport("offline".to_string()));

        let result = coordinator.handle(UiCommand::Submit(valid_form())).await;
        assert_eq!(result, Err(ClientError::Transport("offline".to_string())));
        assert!(!coordinator.is_saving());
        assert_eq!(coordinator.transactions().len(), 2);
    }

    #[tokio::test]
    async fn edit_then_update() {
        let mut coordinator = loaded().await;
        coordinator.handle(UiCommand::EditExpense("1".to_string())).await.unwrap();
        let mut form = coordinator.editing().cloned().unwrap();
        assert_eq!(form.merchant, "Cafe");

        form.merchant = "Tea House".to_string();
        coordinator.handle(UiCommand::Submit(form)).await.unwrap();
        assert!(coordinator.editing().is_none());
        assert!(coordinator.transactions().iter().any(|t| t.merchant == "Tea House"));

        let missing = coordinator.handle(UiCommand::EditExpense("99".to_string())).await;
        assert_eq!(missing, Err(ClientError::NotFound("99".to_string())));
    }

    #[tokio::test]
    async fn editing_uncategorized_row_sends_blank_category() {
        let mut row = spend("1", "2024-03-02", "Cafe", 4500.0);
        row.category = UNCATEGORIZED.to_string();
        let mut coordinator = ExpenseCoordinator::new(FakeApi::with_rows(vec![row]), ymd(2024, 9, 1));
        coordinator.load_initial().await.unwrap();

        coordinator.handle(UiCommand::EditExpense("1".to_string())).await.unwrap();
        let form = coordinator.editing().cloned().unwrap();
        assert_eq!(form.category, "");

        coordinator.handle(UiCommand::Submit(form)).await.unwrap();
        let sent = coordinator.api.last_update.lock().unwrap().clone().unwrap();
        assert_eq!(sent.category.as_deref(), Some(""));
        assert_eq!(sent.merchant.as_deref(), Some("Cafe"));
    }

    #[tokio::test]
    async fn delete_is_two_step() {
        let mut coordinator = loaded().await;

        coordinator.handle(UiCommand::RequestDelete("1".to_string())).await.unwrap();
        coordinator.handle(UiCommand::CancelDelete).await.unwrap();
        assert_eq!(coordinator.pending_delete(), None);
        assert!(!coordinator.confirm_delete().await.unwrap());
        assert_eq!(coordinator.api.call_count("delete"), 0);

        coordinator.handle(UiCommand::RequestDelete("1".to_string())).await.unwrap();
        assert_eq!(coordinator.pending_delete(), Some("1"));
        coordinator.handle(UiCommand::ConfirmDelete).await.unwrap();
        assert_eq!(coordinator.api.call_count("delete"), 1);
        assert_eq!(coordinator.transactions().len(), 1);
        assert_eq!(coordinator.pending_delete(), None);
    }

    #[tokio::test]
    async fn new_expense_prefills_selected_day() {
        let mut coordinator = loaded().await;
        coordinator.handle(UiCommand::NewExpense).await.unwrap();
        assert_eq!(coordinator.editing().map(|f| f.date.as_str()), Some("2024-09-01"));

        coordinator.handle(UiCommand::SelectDate(ymd(2024, 5, 3))).await.unwrap();
        coordinator.handle(UiCommand::NewExpense).await.unwrap();
        assert_eq!(coordinator.editing().map(|f| f.date.as_str()), Some("2024-05-03"));
    }
}
