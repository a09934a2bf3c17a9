//! Split a single payment into interest and principal

use serde::{Deserialize, Serialize};

/// Interest and principal components of one payment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub interest_paid: f64,
    pub principal_paid: f64,
}

impl Decomposition {
    /// Whole payment attributed to principal
    pub fn all_principal(payment_amount: f64) -> Self {
        Self {
            interest_paid: 0.0,
            principal_paid: payment_amount.max(0.0),
        }
    }

    pub fn total(&self) -> f64 {
        self.interest_paid + self.principal_paid
    }
}

/// Decompose `payment_amount` against `outstanding_principal` at
/// `annual_rate_percent`.
///
/// Interest is one month's accrual on the outstanding balance, capped at the
/// payment itself and at the outstanding balance. The remainder is principal.
/// A paid-off balance or a negative rate attributes the whole payment to
/// principal.
pub fn decompose(outstanding_principal: f64, annual_rate_percent: f64, payment_amount: f64) -> Decomposition {
    if outstanding_principal <= 0.0 || annual_rate_percent < 0.0 {
        return Decomposition::all_principal(payment_amount);
    }

    let r = super::monthly_rate(annual_rate_percent);
    let interest = (outstanding_principal * r)
        .min(payment_amount)
        .min(outstanding_principal)
        .max(0.0);
    let principal = (payment_amount - interest).max(0.0);

    Decomposition {
        interest_paid: interest,
        principal_paid: principal,
    }
}
