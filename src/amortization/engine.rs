//! Single-loan payoff projection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::loan::Liability;
use super::group::AllocationPolicy;
use super::schedule::{add_months, AmortizationResult, AmortizationSchedule};
use super::state::LoanState;
use super::{monthly_rate, MAX_SIMULATION_MONTHS};

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Cap on simulated months; a loan still open at the cap is unreachable
    pub max_months: u32,

    /// How a group's shared extra pool is prioritised
    pub allocation: AllocationPolicy,

    /// Fold a finished loan's installment into the group's extra pool
    pub roll_over_finished_installments: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_months: MAX_SIMULATION_MONTHS,
            allocation: AllocationPolicy::Weighted,
            roll_over_finished_installments: true,
        }
    }
}

impl ProjectionConfig {
    pub fn with_allocation(mut self, allocation: AllocationPolicy) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn without_rollover(mut self) -> Self {
        self.roll_over_finished_installments = false;
        self
    }
}

/// Project a loan to payoff with the default configuration
pub fn project(
    principal: f64,
    annual_rate_percent: f64,
    installment: f64,
    extra_monthly: f64,
    start_date: NaiveDate,
) -> AmortizationResult {
    project_with_config(
        &ProjectionConfig::default(),
        principal,
        annual_rate_percent,
        installment,
        extra_monthly,
        start_date,
    )
}

/// Project a loan to payoff, paying `installment + extra_monthly` every month.
///
/// Negative installment or extra amounts count as 0. The result is
/// `Unreachable` when the payment is not positive, when it cannot cover the
/// first month's interest, or when the balance is still open after
/// `config.max_months`.
pub fn project_with_config(
    config: &ProjectionConfig,
    principal: f64,
    annual_rate_percent: f64,
    installment: f64,
    extra_monthly: f64,
    start_date: NaiveDate,
) -> AmortizationResult {
    if !(principal > 0.0) {
        return AmortizationResult::Finite(AmortizationSchedule::paid_off(start_date));
    }

    let installment = installment.max(0.0);
    let extra_monthly = extra_monthly.max(0.0);
    let payment = installment + extra_monthly;
    if !(payment > 0.0) {
        log::debug!("no payment against principal {:.2}: unreachable", principal);
        return AmortizationResult::Unreachable;
    }

    let r = monthly_rate(annual_rate_percent.max(0.0));
    let first_interest = principal * r;
    if payment <= first_interest && payment < principal + first_interest {
        log::debug!(
            "payment {:.2} does not exceed first month interest {:.2}: unreachable",
            payment,
            first_interest
        );
        return AmortizationResult::Unreachable;
    }

    let mut state = LoanState::opening(principal);
    let mut schedule = Vec::new();

    while state.month < config.max_months {
        let (next, entry) = state.advance(r, installment, extra_monthly);
        schedule.push(entry);
        state = next;

        if state.is_paid_off() {
            break;
        }
    }

    if !state.is_paid_off() {
        log::warn!(
            "balance {:.2} still open after {} months: unreachable",
            state.balance,
            config.max_months
        );
        return AmortizationResult::Unreachable;
    }

    match add_months(start_date, state.month) {
        Some(payoff_date) => AmortizationResult::Finite(AmortizationSchedule {
            term_months: state.month,
            total_interest_paid: state.total_interest_paid,
            payoff_date,
            schedule,
        }),
        None => AmortizationResult::Unreachable,
    }
}

/// Preview the payoff of a stored liability from its current outstanding
/// balance.
///
/// Missing rate or installment count as 0. Month 1 of the schedule falls on
/// the liability's next due date.
pub fn project_liability(liability: &Liability, extra_monthly: f64, config: &ProjectionConfig) -> AmortizationResult {
    let start_date = liability
        .next_due_date
        .checked_sub_months(chrono::Months::new(1))
        .unwrap_or(liability.next_due_date);

    project_with_config(
        config,
        liability.outstanding(),
        liability.annual_rate_percent.unwrap_or(0.0),
        liability.installment.unwrap_or(0.0),
        extra_monthly,
        start_date,
    )
}
