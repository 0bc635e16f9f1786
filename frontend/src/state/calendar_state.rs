//! Calendar view model.
//!
//! Weeks start on Sunday. A month that fits in five weeks gets a 35-cell
//! grid, anything longer gets 42. Leading cells come from the end of the
//! previous month and trailing cells from the start of the next.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use shared::aggregation::{daily_total, monthly_total};
use shared::{Transaction, YearMonth};

const FIVE_WEEKS: usize = 35;
const SIX_WEEKS: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Leading,
    Current,
    Trailing,
}

/// What a day cell shows besides its number. A scheduled payment wins over
/// the amount spent.
#[derive(Debug, Clone, PartialEq)]
pub enum CellBadge {
    NextPayment(Vec<String>),
    Amount(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub kind: CellKind,
    pub badge: Option<CellBadge>,
    pub is_today: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarGrid {
    pub month: YearMonth,
    pub cells: Vec<CalendarCell>,
    pub monthly_total: f64,
}

impl CalendarGrid {
    /// Rows of seven cells, Sunday first
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarState {
    current_month: YearMonth,
    selected_date: Option<NaiveDate>,
}

impl CalendarState {
    pub fn new(month: YearMonth) -> Self {
        Self {
            current_month: month,
            selected_date: None,
        }
    }

    pub fn current_month(&self) -> YearMonth {
        self.current_month
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// Move the cursor by `delta` months and drop the selection
    pub fn advance_month(&mut self, delta: i32) {
        self.jump_to(self.current_month.add_months(delta));
    }

    pub fn jump_to(&mut self, month: YearMonth) {
        self.current_month = month;
        self.selected_date = None;
    }

    /// Select a day visible on the current grid, leading and trailing cells
    /// included. Returns whether the selection changed to `date`.
    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        let (first, last) = self.grid_span();
        if date < first || date > last {
            return false;
        }
        self.selected_date = Some(date);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_date = None;
    }

    /// First and last date shown on the grid
    pub fn grid_span(&self) -> (NaiveDate, NaiveDate) {
        let first = grid_start(self.current_month);
        let last = first
            .checked_add_days(Days::new(cell_count(self.current_month) as u64 - 1))
            .unwrap_or(first);
        (first, last)
    }

    pub fn build_grid(
        &self,
        transactions: &[Transaction],
        next_payments: &BTreeMap<NaiveDate, Vec<String>>,
        today: NaiveDate,
    ) -> CalendarGrid {
        let month = self.current_month;
        let cells = grid_start(month)
            .iter_days()
            .take(cell_count(month))
            .map(|date| {
                let kind = if date < month.first_day() {
                    CellKind::Leading
                } else if date > month.last_day() {
                    CellKind::Trailing
                } else {
                    CellKind::Current
                };
                let badge = if kind == CellKind::Current {
                    badge_for(date, transactions, next_payments)
                } else {
                    None
                };
                CalendarCell {
                    date,
                    kind,
                    badge,
                    is_today: date == today,
                    is_selected: self.selected_date == Some(date),
                }
            })
            .collect();

        CalendarGrid {
            month,
            cells,
            monthly_total: monthly_total(transactions, month),
        }
    }
}

fn badge_for(
    date: NaiveDate,
    transactions: &[Transaction],
    next_payments: &BTreeMap<NaiveDate, Vec<String>>,
) -> Option<CellBadge> {
    if let Some(names) = next_payments.get(&date).filter(|names| !names.is_empty()) {
        return Some(CellBadge::NextPayment(names.clone()));
    }
    let total = daily_total(transactions, date);
    (total > 0.0).then_some(CellBadge::Amount(total))
}

fn grid_start(month: YearMonth) -> NaiveDate {
    let first = month.first_day();
    first
        .checked_sub_days(Days::new(month.first_weekday_from_sunday() as u64))
        .unwrap_or(first)
}

fn cell_count(month: YearMonth) -> usize {
    let needed = (month.first_weekday_from_sunday() + month.days_in_month()) as usize;
    if needed <= FIVE_WEEKS {
        FIVE_WEEKS
    } else {
        SIX_WEEKS
    }
}
