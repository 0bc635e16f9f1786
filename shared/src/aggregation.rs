//! Aggregation engine.
//!
//! Pure functions over a slice of normalized [`Transaction`]s. Nothing here
//! performs IO or keeps state, so the server's statistics/calendar endpoints
//! and the client's view models compute identical numbers from identical
//! inputs.
//!
//! Records whose date is empty (the normalizer could not parse one) still
//! contribute to group totals but are excluded from every day- or
//! month-scoped calculation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Transaction, YearMonth, UNCATEGORIZED};

/// Number of buckets in the monthly trend series
pub const TRAILING_MONTHS: usize = 12;

/// Dimension used to group transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupBy {
    Merchant,
    PaymentMethod,
    PaymentCycle,
    Category,
}

impl GroupBy {
    pub fn key_of(&self, transaction: &Transaction) -> String {
        match self {
            GroupBy::Merchant => transaction.merchant.clone(),
            GroupBy::PaymentMethod => transaction.payment_method.clone(),
            GroupBy::PaymentCycle => transaction.payment_cycle.clone(),
            GroupBy::Category => {
                if transaction.category.trim().is_empty() {
                    UNCATEGORIZED.to_string()
                } else {
                    transaction.category.clone()
                }
            }
        }
    }
}

/// Total and number of transactions for one calendar day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub total: f64,
    pub count: usize,
}

/// One point of the monthly trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub month: YearMonth,
    /// `YY.MM`
    pub label: String,
    pub total: f64,
}

/// A vendor's spending in one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorYear {
    pub year: i32,
    pub total: f64,
    /// Most recent first
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorBreakdown {
    pub vendor: String,
    pub total: f64,
    /// Most recent year first
    pub years: Vec<VendorYear>,
}

pub fn total_amount(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(|t| t.amount).sum()
}

/// Sum of amounts recorded on `day`
pub fn daily_total(transactions: &[Transaction], day: NaiveDate) -> f64 {
    transactions
        .iter()
        .filter(|t| t.calendar_date() == Some(day))
        .map(|t| t.amount)
        .sum()
}

/// Sum of amounts recorded in `month`
pub fn monthly_total(transactions: &[Transaction], month: YearMonth) -> f64 {
    transactions
        .iter()
        .filter(|t| t.calendar_date().map_or(false, |d| month.contains(d)))
        .map(|t| t.amount)
        .sum()
}

/// Per-day totals and counts for every day of `month` that has activity
pub fn daily_summaries(transactions: &[Transaction], month: YearMonth) -> BTreeMap<NaiveDate, DayTotals> {
    let mut summaries: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for transaction in transactions {
        let Some(day) = transaction.calendar_date() else {
            continue;
        };
        if !month.contains(day) {
            continue;
        }
        let entry = summaries.entry(day).or_default();
        entry.total += transaction.amount;
        entry.count += 1;
    }
    summaries
}

/// Cumulative amount per group key, listed alphabetically by key
pub fn grouped_totals(transactions: &[Transaction], group: GroupBy) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for transaction in transactions {
        *totals.entry(group.key_of(transaction)).or_insert(0.0) += transaction.amount;
    }
    totals
}

/// Group totals ordered by amount, largest first; ties fall back to the key
pub fn ranked_totals(transactions: &[Transaction], group: GroupBy) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = grouped_totals(transactions, group).into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Group total divided by the number of distinct months the group was active
/// in. A group with no dated records divides by one.
pub fn monthly_average_by_group(transactions: &[Transaction], group: GroupBy) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut months: HashMap<String, BTreeSet<YearMonth>> = HashMap::new();

    for transaction in transactions {
        let key = group.key_of(transaction);
        *totals.entry(key.clone()).or_insert(0.0) += transaction.amount;
        let active = months.entry(key).or_default();
        if let Some(day) = transaction.calendar_date() {
            active.insert(YearMonth::of(day));
        }
    }

    totals
        .into_iter()
        .map(|(key, total)| {
            let denominator = months.get(&key).map_or(0, BTreeSet::len).max(1);
            (key, total / denominator as f64)
        })
        .collect()
}

/// Most recent valid transaction date
pub fn latest_date(transactions: &[Transaction]) -> Option<NaiveDate> {
    transactions.iter().filter_map(Transaction::calendar_date).max()
}

/// `count` consecutive monthly totals ending at the month of the most recent
/// transaction (or `today`'s month when nothing is dated), oldest first.
/// Months without activity are present with a zero total.
pub fn trailing_months(transactions: &[Transaction], count: usize, today: NaiveDate) -> Vec<MonthBucket> {
    let anchor = YearMonth::of(latest_date(transactions).unwrap_or(today));

    let mut totals: HashMap<YearMonth, f64> = HashMap::new();
    for transaction in transactions {
        if let Some(day) = transaction.calendar_date() {
            *totals.entry(YearMonth::of(day)).or_insert(0.0) += transaction.amount;
        }
    }

    (0..count)
        .rev()
        .map(|back| {
            let month = anchor.add_months(-(back as i32));
            MonthBucket {
                month,
                label: month.short_label(),
                total: totals.get(&month).copied().unwrap_or(0.0),
            }
        })
        .collect()
}

/// Transactions recorded on `day`, most recent id first
pub fn transactions_on(transactions: &[Transaction], day: NaiveDate) -> Vec<&Transaction> {
    let mut matching: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.calendar_date() == Some(day))
        .collect();
    matching.sort_by(|a, b| compare_ids(&b.id, &a.id));
    matching
}

/// Sort newest first. Undated records sink to the bottom.
pub fn sort_by_date_desc(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.calendar_date()
            .cmp(&a.calendar_date())
            .then_with(|| compare_ids(&b.id, &a.id))
    });
}

/// Vendors alphabetically; within each vendor, years newest first with that
/// year's transactions newest first. Undated records are left out.
pub fn vendor_breakdown(transactions: &[Transaction]) -> Vec<VendorBreakdown> {
    let mut by_vendor: BTreeMap<String, BTreeMap<i32, Vec<Transaction>>> = BTreeMap::new();
    for transaction in transactions {
        let Some(day) = transaction.calendar_date() else {
            continue;
        };
        by_vendor
            .entry(transaction.merchant.clone())
            .or_default()
            .entry(day.year())
            .or_default()
            .push(transaction.clone());
    }

    by_vendor
        .into_iter()
        .map(|(vendor, years)| {
            let years: Vec<VendorYear> = years
                .into_iter()
                .rev()
                .map(|(year, mut transactions)| {
                    sort_by_date_desc(&mut transactions);
                    VendorYear {
                        year,
                        total: total_amount(&transactions),
                        transactions,
                    }
                })
                .collect();
            VendorBreakdown {
                total: years.iter().map(|y| y.total).sum(),
                vendor,
                years,
            }
        })
        .collect()
}

/// Numeric ids compare as numbers, everything else lexically
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}
