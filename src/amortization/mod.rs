//! Amortization engine: installments, payment decomposition, single-loan and
//! group payoff projections

mod installment;
mod decompose;
mod state;
mod schedule;
mod engine;
mod group;

pub use installment::compute_installment;
pub use decompose::{decompose, Decomposition};
pub use state::LoanState;
pub use schedule::{AmortizationResult, AmortizationSchedule, MonthEntry};
pub use engine::{project, project_liability, project_with_config, ProjectionConfig};
pub use group::{project_group, AllocationPolicy, GroupLoan, GroupPayoff, LoanProjection, MultiLoanResult};

/// Termination cap for every month-by-month simulation (100 years)
pub const MAX_SIMULATION_MONTHS: u32 = 1200;

/// A balance at or below this is treated as paid off
pub const PAYOFF_EPSILON: f64 = 0.005;

/// Tolerance for interest + principal == payment and schedule-sum checks
pub const ROUNDING_TOLERANCE: f64 = 0.01;

/// Monthly periodic rate from an annual percentage (12.0 -> 0.01)
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 12.0 / 100.0
}
