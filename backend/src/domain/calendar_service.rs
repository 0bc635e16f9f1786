//! Calendar data for one month.
//!
//! Combines the per-day totals from the aggregation engine with the
//! "next scheduled payment" annotations: for each merchant, the most recent
//! dated expense that has a payment cycle is advanced by that cycle. A cycle
//! on the payee sheet takes precedence over the one written on the expense.
//! Predicted dates outside the month or before today are dropped.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::models::payee::DomainPayee;
use shared::aggregation::daily_summaries;
use shared::dates::format_date;
use shared::{CalendarDataResponse, DailySummary, PaymentCycle, Transaction, YearMonth};

#[derive(Clone, Default)]
pub struct CalendarService;

impl CalendarService {
    pub fn new() -> Self {
        Self
    }

    /// `daily_data` for the calendar endpoint
    pub fn calendar_month(
        &self,
        month: YearMonth,
        transactions: &[Transaction],
        payees: &[DomainPayee],
        today: NaiveDate,
    ) -> CalendarDataResponse {
        let mut daily_data: BTreeMap<String, DailySummary> = daily_summaries(transactions, month)
            .into_iter()
            .map(|(day, totals)| {
                (
                    format_date(day),
                    DailySummary {
                        total: totals.total,
                        count: totals.count,
                        next_payments: Vec::new(),
                    },
                )
            })
            .collect();

        for (day, merchants) in self.next_payments(month, transactions, payees, today) {
            daily_data.entry(format_date(day)).or_default().next_payments = merchants;
        }

        debug!("Calendar {} has {} active days", month, daily_data.len());
        CalendarDataResponse { daily_data }
    }

    /// Predicted payment dates inside `month`, not before `today`, mapped to
    /// the merchants due that day (alphabetical)
    pub fn next_payments(
        &self,
        month: YearMonth,
        transactions: &[Transaction],
        payees: &[DomainPayee],
        today: NaiveDate,
    ) -> BTreeMap<NaiveDate, Vec<String>> {
        let payee_cycles: HashMap<&str, &str> = payees
            .iter()
            .filter(|p| !p.name.trim().is_empty() && !p.payment_cycle.trim().is_empty())
            .map(|p| (p.name.trim(), p.payment_cycle.trim()))
            .collect();

        let mut last_payment: HashMap<&str, (NaiveDate, &str)> = HashMap::new();
        for transaction in transactions {
            let merchant = transaction.merchant.trim();
            let Some(date) = transaction.calendar_date() else {
                continue;
            };
            if merchant.is_empty() {
                continue;
            }
            let cycle = payee_cycles
                .get(merchant)
                .copied()
                .unwrap_or_else(|| transaction.payment_cycle.trim());
            if cycle.is_empty() {
                continue;
            }
            match last_payment.get(merchant) {
                Some((latest, _)) if *latest >= date => {}
                _ => {
                    last_payment.insert(merchant, (date, cycle));
                }
            }
        }

        let mut due: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
        for (merchant, (date, cycle)) in last_payment {
            let Some(cycle) = PaymentCycle::parse(cycle) else {
                continue;
            };
            let next = cycle.next_after(date);
            if month.contains(next) && next >= today {
                due.entry(next).or_default().push(merchant.to_string());
            }
        }
        for merchants in due.values_mut() {
            merchants.sort();
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: &str, merchant: &str, amount: f64, cycle: &str) -> Transaction {
        Transaction {
            id: format!("{}-{}", merchant, date),
            date: date.to_string(),
            merchant: merchant.to_string(),
            amount,
            payment_method: "card".to_string(),
            payment_cycle: cycle.to_string(),
            category: String::new(),
            content: String::new(),
        }
    }

    fn payee(name: &str, cycle: &str) -> DomainPayee {
        DomainPayee {
            id: name.to_string(),
            name: name.to_string(),
            payment_cycle: cycle.to_string(),
            ..Default::default()
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_data_has_totals_and_counts() {
        let transactions = vec![
            tx("2024-05-10", "Cafe", 4500.0, ""),
            tx("2024-05-10", "Bakery", 3000.0, ""),
            tx("2024-06-01", "Cafe", 100.0, ""),
        ];
        let service = CalendarService::new();
        let data = service.calendar_month(YearMonth::new(2024, 5).unwrap(), &transactions, &[], ymd(2024, 1, 1));

        assert_eq!(data.daily_data.len(), 1);
        let day = &data.daily_data["2024-05-10"];
        assert_eq!(day.total, 7500.0);
        assert_eq!(day.count, 2);
        assert!(day.next_payments.is_empty());
    }

    #[test]
    fn next_payment_uses_latest_payment_and_cycle() {
        let transactions = vec![
            tx("2024-03-15", "Piano", 150000.0, "1M"),
            tx("2024-04-15", "Piano", 150000.0, "1M"),
            tx("2024-02-20", "Art", 90000.0, "3M"),
            tx("2024-04-30", "Cafe", 4500.0, ""),
        ];
        let service = CalendarService::new();
        let data = service.calendar_month(YearMonth::new(2024, 5).unwrap(), &transactions, &[], ymd(2024, 5, 1));

        assert_eq!(data.daily_data["2024-05-15"].next_payments, vec!["Piano"]);
        assert_eq!(data.daily_data["2024-05-15"].count, 0);
        assert_eq!(data.daily_data["2024-05-20"].next_payments, vec!["Art"]);
        assert_eq!(data.daily_data.len(), 2);
    }

    #[test]
    fn payee_cycle_overrides_expense_cycle() {
        let transactions = vec![tx("2024-02-10", "Piano", 150000.0, "1M")];
        let payees = vec![payee("Piano", "3M")];
        let due = CalendarService::new().next_payments(
            YearMonth::new(2024, 5).unwrap(),
            &transactions,
            &payees,
            ymd(2024, 1, 1),
        );
        assert_eq!(due.get(&ymd(2024, 5, 10)), Some(&vec!["Piano".to_string()]));
    }

    #[test]
    fn past_due_dates_are_dropped() {
        let transactions = vec![tx("2024-04-03", "Piano", 150000.0, "1M")];
        let due = CalendarService::new().next_payments(
            YearMonth::new(2024, 5).unwrap(),
            &transactions,
            &[],
            ymd(2024, 5, 4),
        );
        assert!(due.is_empty());
    }

    #[test]
    fn month_end_payment_clamps() {
        let transactions = vec![tx("2024-01-31", "Gym", 60000.0, "1M")];
        let due = CalendarService::new().next_payments(
            YearMonth::new(2024, 2).unwrap(),
            &transactions,
            &[],
            ymd(2024, 2, 1),
        );
        assert_eq!(due.keys().next(), Some(&ymd(2024, 2, 29)));
    }
}
