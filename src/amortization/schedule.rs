//! Projection output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One simulated month of a payoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthEntry {
    /// Month number (1-indexed)
    pub month: u32,
    pub interest_paid: f64,
    pub principal_paid: f64,
    /// Balance after this month's payment
    pub remaining_balance: f64,
    /// Part of the payment beyond the installment
    pub extra_applied: f64,
}

/// Payoff schedule of a loan that can be retired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub term_months: u32,
    pub total_interest_paid: f64,
    pub payoff_date: NaiveDate,
    pub schedule: Vec<MonthEntry>,
}

impl AmortizationSchedule {
    /// Schedule of a loan that is already paid off at `start_date`
    pub fn paid_off(start_date: NaiveDate) -> Self {
        Self {
            term_months: 0,
            total_interest_paid: 0.0,
            payoff_date: start_date,
            schedule: Vec::new(),
        }
    }

    pub fn total_principal_paid(&self) -> f64 {
        self.schedule.iter().map(|e| e.principal_paid).sum()
    }

    pub fn total_extra_applied(&self) -> f64 {
        self.schedule.iter().map(|e| e.extra_applied).sum()
    }

    pub fn total_paid(&self) -> f64 {
        self.total_principal_paid() + self.total_interest_paid
    }
}

/// Outcome of a payoff projection.
///
/// `Unreachable` means the payment can never retire the loan; it carries no
/// numbers so callers cannot do arithmetic on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AmortizationResult {
    Finite(AmortizationSchedule),
    Unreachable,
}

impl AmortizationResult {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, AmortizationResult::Unreachable)
    }

    pub fn as_finite(&self) -> Option<&AmortizationSchedule> {
        match self {
            AmortizationResult::Finite(schedule) => Some(schedule),
            AmortizationResult::Unreachable => None,
        }
    }

    pub fn term_months(&self) -> Option<u32> {
        self.as_finite().map(|s| s.term_months)
    }

    pub fn total_interest_paid(&self) -> Option<f64> {
        self.as_finite().map(|s| s.total_interest_paid)
    }

    pub fn payoff_date(&self) -> Option<NaiveDate> {
        self.as_finite().map(|s| s.payoff_date)
    }

    /// Month entries; empty when unreachable
    pub fn schedule(&self) -> &[MonthEntry] {
        match self {
            AmortizationResult::Finite(schedule) => &schedule.schedule,
            AmortizationResult::Unreachable => &[],
        }
    }
}

/// Calendar month arithmetic for payoff dates.
///
/// Day of month is kept where valid and clamped to the month's last day
/// otherwise (Jan 31 + 1 month = Feb 28/29).
pub(crate) fn add_months(start_date: NaiveDate, months: u32) -> Option<NaiveDate> {
    start_date.checked_add_months(chrono::Months::new(months))
}
