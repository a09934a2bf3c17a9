//! Loan terms, stored liabilities and recorded payments

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amortization::compute_installment;

/// Identifier of a loan inside a group projection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(String);

impl LoanId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a recorded payment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contractual shape of a loan at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Outstanding principal
    pub principal: f64,

    /// Annual interest rate in percent (12.0 = 12%)
    pub annual_rate_percent: f64,

    /// Contractual term in months
    #[serde(default)]
    pub term_months: Option<u32>,

    /// Fixed monthly installment, if already agreed
    #[serde(default)]
    pub installment: Option<f64>,
}

impl LoanTerms {
    /// Terms with an explicit installment
    pub fn with_installment(principal: f64, annual_rate_percent: f64, installment: f64) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months: None,
            installment: Some(installment),
        }
    }

    /// Terms with a contractual term; the installment is derived on demand
    pub fn with_term(principal: f64, annual_rate_percent: f64, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months: Some(term_months),
            installment: None,
        }
    }

    /// Installment used for projections.
    ///
    /// An explicit installment wins; otherwise it is computed from the term.
    /// Terms carrying neither resolve to 0.
    pub fn resolved_installment(&self) -> f64 {
        match (self.installment, self.term_months) {
            (Some(installment), _) => installment,
            (None, Some(term)) => compute_installment(self.principal, self.annual_rate_percent, term),
            (None, None) => 0.0,
        }
    }
}

/// A liability as stored by the owning application.
///
/// The engine never mutates this; it computes new `amount_repaid` values for
/// the caller to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liability {
    /// Original principal
    pub initial_amount: f64,

    /// Principal repaid so far
    pub amount_repaid: f64,

    /// Annual interest rate in percent, if configured
    #[serde(default)]
    pub annual_rate_percent: Option<f64>,

    /// Monthly installment, if configured
    #[serde(default)]
    pub installment: Option<f64>,

    /// Next installment due date
    pub next_due_date: NaiveDate,
}

impl Liability {
    pub fn new(initial_amount: f64, next_due_date: NaiveDate) -> Self {
        Self {
            initial_amount,
            amount_repaid: 0.0,
            annual_rate_percent: None,
            installment: None,
            next_due_date,
        }
    }

    pub fn with_rate(mut self, annual_rate_percent: f64) -> Self {
        self.annual_rate_percent = Some(annual_rate_percent);
        self
    }

    pub fn with_installment(mut self, installment: f64) -> Self {
        self.installment = Some(installment);
        self
    }

    pub fn with_amount_repaid(mut self, amount_repaid: f64) -> Self {
        self.amount_repaid = amount_repaid;
        self
    }

    /// Principal still owed
    pub fn outstanding(&self) -> f64 {
        (self.initial_amount - self.amount_repaid).max(0.0)
    }

    /// Clamp a repaid amount into `[0, initial_amount]`
    pub fn clamp_repaid(&self, amount_repaid: f64) -> f64 {
        amount_repaid.max(0.0).min(self.initial_amount.max(0.0))
    }
}

/// One recorded payment against a liability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: PaymentId,

    /// Amount paid, interest and principal together
    pub amount: f64,

    /// Calendar date the payment was made
    pub date: NaiveDate,

    /// Tiebreak for payments sharing a date (creation order)
    pub sequence_key: u64,
}

impl PaymentEvent {
    pub fn new(id: impl Into<String>, amount: f64, date: NaiveDate, sequence_key: u64) -> Self {
        Self {
            id: PaymentId::new(id),
            amount,
            date,
            sequence_key,
        }
    }

    /// Replay ordering: by date, then by sequence key
    pub fn ordering_key(&self) -> (NaiveDate, u64) {
        (self.date, self.sequence_key)
    }
}

/// Stable sort of a payment history into replay order
pub fn sort_payments(payments: &mut [PaymentEvent]) {
    payments.sort_by_key(PaymentEvent::ordering_key);
}
