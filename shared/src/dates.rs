//! Calendar helpers shared by the server and the client.
//!
//! All calendar days are interpreted in one fixed display zone (UTC+09:00),
//! so a timestamp written at 2024-02-29T15:00:00Z belongs to March 1st no
//! matter where the code runs.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset of the display zone from UTC, in seconds
pub const DISPLAY_UTC_OFFSET_SECS: i32 = 9 * 3600;

pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(DISPLAY_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Today's date in the display zone
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&display_offset()).date_naive()
}

/// Parse any of the date shapes found in sheets and forms into a calendar day.
///
/// Accepts RFC 3339 timestamps (shifted into the display zone), `YYYY-MM-DD`
/// with or without a trailing time, `YYYY/MM/DD`, `YYYY.MM.DD` and the
/// two-digit `YY/MM/DD` used by card statement exports.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&display_offset()).date_naive());
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            if date.year() >= 1000 {
                return Some(date);
            }
        }
    }

    if let Some(date) = raw.get(..10).and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()) {
        return Some(date);
    }

    parse_short_year(raw)
}

/// `YY/MM/DD` or `YY-MM-DD`, two-digit years belong to the 2000s
fn parse_short_year(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split(['/', '-', '.']).map(str::trim).collect();
    if parts.len() != 3 || parts[0].len() != 2 {
        return None;
    }
    let year = 2000 + parts[0].parse::<i32>().ok()?;
    let month = parts[1].parse::<u32>().ok()?;
    let day = parts[2].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Render a calendar day the way every surface stores it
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// A calendar month, used as the cursor of the calendar and as the bucket key
/// of monthly aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` when `month` is outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::of(today())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.add_months(1).first_day().pred_opt().unwrap_or_default()
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Weekday of the 1st, counted from Sunday = 0
    pub fn first_weekday_from_sunday(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    /// Shift by any number of months, crossing year boundaries as needed
    pub fn add_months(&self, delta: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + delta;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn previous(&self) -> Self {
        self.add_months(-1)
    }

    pub fn next(&self) -> Self {
        self.add_months(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Chart label, e.g. `24.03`
    pub fn short_label(&self) -> String {
        format!("{:02}.{:02}", self.year.rem_euclid(100), self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
