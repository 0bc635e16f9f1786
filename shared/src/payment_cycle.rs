//! Recurring payment cycles.
//!
//! Expenses and payees carry a free-text cycle field; the four codes below are
//! the ones the scheduler understands. Anything else is treated as a one-off.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentCycle {
    #[serde(rename = "1M")]
    Monthly,
    #[serde(rename = "3M")]
    Quarterly,
    #[serde(rename = "6M")]
    SemiAnnual,
    #[serde(rename = "1Y")]
    Yearly,
}

impl PaymentCycle {
    pub const ALL: [PaymentCycle; 4] = [
        PaymentCycle::Monthly,
        PaymentCycle::Quarterly,
        PaymentCycle::SemiAnnual,
        PaymentCycle::Yearly,
    ];

    /// Parse a cycle code such as `1M` or `1y`; unknown text yields `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "1M" => Some(PaymentCycle::Monthly),
            "3M" => Some(PaymentCycle::Quarterly),
            "6M" => Some(PaymentCycle::SemiAnnual),
            "1Y" | "12M" => Some(PaymentCycle::Yearly),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PaymentCycle::Monthly => "1M",
            PaymentCycle::Quarterly => "3M",
            PaymentCycle::SemiAnnual => "6M",
            PaymentCycle::Yearly => "1Y",
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            PaymentCycle::Monthly => 1,
            PaymentCycle::Quarterly => 3,
            PaymentCycle::SemiAnnual => 6,
            PaymentCycle::Yearly => 12,
        }
    }

    /// The next payment after `date`. The day is clamped to the length of the
    /// target month, so Jan 31 + 1M is Feb 29 in a leap year.
    pub fn next_after(&self, date: NaiveDate) -> NaiveDate {
        date.checked_add_months(Months::new(self.months())).unwrap_or(date)
    }
}

impl fmt::Display for PaymentCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
