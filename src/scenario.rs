//! Scenario runner for batch what-if projections
//!
//! Holds one projection configuration and runs many previews against it,
//! fanning the independent projections out across threads.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::amortization::{
    project_group, project_with_config, AllocationPolicy, AmortizationResult, GroupLoan, MultiLoanResult,
    ProjectionConfig,
};

/// Effect of one monthly extra amount against paying the installment alone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPaymentComparison {
    pub extra_monthly: f64,
    pub result: AmortizationResult,
    /// `None` when either projection is unreachable
    pub months_saved: Option<i64>,
    /// `None` when either projection is unreachable
    pub interest_saved: Option<f64>,
}

/// Pre-configured runner for batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let comparisons = runner.run_extra_scenarios(25_000.0, 7.5, 500.0, &[0.0, 100.0, 250.0], start);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: ProjectionConfig,
}

impl ScenarioRunner {
    /// Create runner with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create runner with a specific configuration
    pub fn with_config(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Project one loan under each extra amount and compare every run with
    /// the zero-extra baseline.
    pub fn run_extra_scenarios(
        &self,
        principal: f64,
        annual_rate_percent: f64,
        installment: f64,
        extras: &[f64],
        start_date: NaiveDate,
    ) -> Vec<ExtraPaymentComparison> {
        log::info!("running {} extra-payment scenarios", extras.len());

        let baseline = project_with_config(&self.config, principal, annual_rate_percent, installment, 0.0, start_date);

        extras
            .par_iter()
            .map(|&extra| {
                let result =
                    project_with_config(&self.config, principal, annual_rate_percent, installment, extra, start_date);

                let (months_saved, interest_saved) = match (baseline.as_finite(), result.as_finite()) {
                    (Some(base), Some(run)) => (
                        Some(base.term_months as i64 - run.term_months as i64),
                        Some(base.total_interest_paid - run.total_interest_paid),
                    ),
                    _ => (None, None),
                };

                ExtraPaymentComparison {
                    extra_monthly: extra,
                    result,
                    months_saved,
                    interest_saved,
                }
            })
            .collect()
    }

    /// Run the group projection once per allocation policy
    pub fn compare_policies(
        &self,
        loans: &[GroupLoan],
        total_extra_monthly: f64,
        start_date: NaiveDate,
    ) -> Vec<MultiLoanResult> {
        AllocationPolicy::ALL
            .par_iter()
            .map(|&policy| {
                let config = self.config.clone().with_allocation(policy);
                project_group(loans, total_extra_monthly, start_date, &config)
            })
            .collect()
    }

    /// Run the group projection for every `(policy, extra)` pair
    pub fn run_group_grid(
        &self,
        loans: &[GroupLoan],
        extras: &[f64],
        start_date: NaiveDate,
    ) -> Vec<(f64, MultiLoanResult)> {
        let runs: Vec<(AllocationPolicy, f64)> = AllocationPolicy::ALL
            .iter()
            .flat_map(|&policy| extras.iter().map(move |&extra| (policy, extra)))
            .collect();
        log::info!("running {} group projections over {} loans", runs.len(), loans.len());

        runs.par_iter()
            .map(|&(policy, extra)| {
                let config = self.config.clone().with_allocation(policy);
                (extra, project_group(loans, extra, start_date, &config))
            })
            .collect()
    }

    /// Configuration used for every run
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Mutable configuration for customization
    pub fn config_mut(&mut self) -> &mut ProjectionConfig {
        &mut self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::LoanTerms;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_extra_scenarios_save_time_and_interest() {
        let runner = ScenarioRunner::new();
        let results = runner.run_extra_scenarios(30_000.0, 9.0, 450.0, &[0.0, 100.0, 300.0], start());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].months_saved, Some(0));
        assert_eq!(results[0].interest_saved, Some(0.0));

        assert!(results[1].months_saved.unwrap() > 0);
        assert!(results[2].months_saved.unwrap() > results[1].months_saved.unwrap());
        assert!(results[2].interest_saved.unwrap() > results[1].interest_saved.unwrap());
    }

    #[test]
    fn test_unreachable_baseline_has_no_savings() {
        let runner = ScenarioRunner::new();
        // 1000 a month in interest against a 900 installment
        let results = runner.run_extra_scenarios(100_000.0, 12.0, 900.0, &[500.0], start());

        assert!(!results[0].result.is_unreachable());
        assert_eq!(results[0].months_saved, None);
        assert_eq!(results[0].interest_saved, None);
    }

    #[test]
    fn test_compare_policies_runs_each_policy() {
        let runner = ScenarioRunner::new();
        let loans = vec![
            GroupLoan::new("a", LoanTerms::with_installment(5_000.0, 18.0, 150.0)),
            GroupLoan::new("b", LoanTerms::with_installment(40_000.0, 5.0, 500.0)),
        ];
        let results = runner.compare_policies(&loans, 200.0, start());

        let policies: Vec<AllocationPolicy> = results.iter().map(|r| r.policy).collect();
        assert_eq!(policies, AllocationPolicy::ALL.to_vec());
        assert!(results.iter().all(|r| !r.overall.is_unreachable()));
    }

    #[test]
    fn test_group_grid_size() {
        let runner = ScenarioRunner::new();
        let loans = vec![GroupLoan::new("a", LoanTerms::with_term(10_000.0, 6.0, 36))];
        let grid = runner.run_group_grid(&loans, &[0.0, 50.0, 100.0], start());
        assert_eq!(grid.len(), 6);
    }
}
