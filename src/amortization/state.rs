//! Per-loan simulation state for one month of a projection

use super::schedule::MonthEntry;
use super::PAYOFF_EPSILON;

/// State of a loan at the start of a simulated month.
///
/// States are values: `advance` consumes one and returns the next, so a
/// projection is a fold over months.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanState {
    /// Months already simulated
    pub month: u32,

    /// Outstanding principal
    pub balance: f64,

    /// Interest charged so far
    pub total_interest_paid: f64,

    /// Extra payment absorbed so far
    pub total_extra_received: f64,
}

impl LoanState {
    /// Opening state of a loan with `principal` outstanding
    pub fn opening(principal: f64) -> Self {
        Self {
            month: 0,
            balance: principal.max(0.0),
            total_interest_paid: 0.0,
            total_extra_received: 0.0,
        }
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= PAYOFF_EPSILON
    }

    /// Interest accrued on the current balance this month
    pub fn interest_due(&self, monthly_rate: f64) -> f64 {
        if monthly_rate > 0.0 {
            self.balance * monthly_rate
        } else {
            0.0
        }
    }

    /// Amount beyond `installment` that would clear the loan this month.
    ///
    /// This is the principal left after the installment is applied, plus any
    /// interest the installment does not cover.
    pub fn extra_needed(&self, monthly_rate: f64, installment: f64) -> f64 {
        (self.balance + self.interest_due(monthly_rate) - installment.max(0.0)).max(0.0)
    }

    /// Apply one month: accrue interest, then pay `installment + extra`.
    ///
    /// The payment is capped at balance plus interest so the final month never
    /// overpays, and the interest recorded is `payment - principal` so the two
    /// components always sum to the payment.
    pub fn advance(self, monthly_rate: f64, installment: f64, extra: f64) -> (LoanState, MonthEntry) {
        let installment = installment.max(0.0);
        let interest = self.interest_due(monthly_rate);

        let mut payment = installment + extra.max(0.0);
        if payment >= self.balance + interest {
            payment = self.balance + interest;
        }

        let principal_paid = (payment - interest).max(0.0).min(self.balance);
        let interest_paid = payment - principal_paid;
        let extra_applied = (payment - installment).max(0.0);
        let balance = (self.balance - principal_paid).max(0.0);

        let next = LoanState {
            month: self.month + 1,
            balance,
            total_interest_paid: self.total_interest_paid + interest_paid,
            total_extra_received: self.total_extra_received + extra_applied,
        };

        let entry = MonthEntry {
            month: next.month,
            interest_paid,
            principal_paid,
            remaining_balance: balance,
            extra_applied,
        };

        (next, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_advance_regular_month() {
        let state = LoanState::opening(10_000.0);
        let (next, entry) = state.advance(0.01, 500.0, 0.0);

        assert_eq!(next.month, 1);
        assert_abs_diff_eq!(entry.interest_paid, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(entry.principal_paid, 400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(next.balance, 9_600.0, epsilon = 1e-9);
        assert_eq!(entry.extra_applied, 0.0);
    }

    #[test]
    fn test_advance_final_month_never_overpays() {
        let state = LoanState::opening(300.0);
        let (next, entry) = state.advance(0.01, 500.0, 100.0);

        // Payment capped at 300 + 3 interest
        assert_abs_diff_eq!(entry.interest_paid + entry.principal_paid, 303.0, epsilon = 1e-9);
        assert_eq!(next.balance, 0.0);
        assert_eq!(entry.extra_applied, 0.0);
        assert!(next.is_paid_off());
    }

    #[test]
    fn test_extra_counts_only_what_is_paid() {
        let state = LoanState::opening(1_000.0);
        let (next, entry) = state.advance(0.0, 600.0, 1_000.0);

        assert_abs_diff_eq!(entry.extra_applied, 400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(next.total_extra_received, 400.0, epsilon = 1e-9);
        assert_eq!(next.balance, 0.0);
    }

    #[test]
    fn test_extra_needed_covers_interest_shortfall() {
        let state = LoanState::opening(10_000.0);
        // Interest 100, installment 50: needs the balance plus the unpaid 50
        assert_abs_diff_eq!(state.extra_needed(0.01, 50.0), 10_050.0, epsilon = 1e-9);
        // Installment larger than balance + interest needs nothing
        assert_eq!(state.extra_needed(0.01, 20_000.0), 0.0);
    }
}
