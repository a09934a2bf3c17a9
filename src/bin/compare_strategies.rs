//! Compare allocation policies over a range of extra monthly amounts
//!
//! Usage: cargo run --bin compare_strategies -- loans.csv [output.csv] [extras]
//!
//! `extras` is a comma-separated list, e.g. `0,100,250,500`.

use std::env;
use std::fs::File;
use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::Utc;

use liability_engine::amortization::{GroupLoan, GroupPayoff, MultiLoanResult};
use liability_engine::loan::load_group_loans;
use liability_engine::ScenarioRunner;

const DEFAULT_EXTRAS: [f64; 5] = [0.0, 100.0, 250.0, 500.0, 1_000.0];

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let loans_path = args.get(1).map(String::as_str).unwrap_or("loans.csv");
    let output_path = args.get(2).map(String::as_str);
    let extras = match args.get(3) {
        Some(list) => parse_extras(list)?,
        None => DEFAULT_EXTRAS.to_vec(),
    };

    log::info!("loading loans from {}", loans_path);
    let loans: Vec<GroupLoan> = load_group_loans(loans_path)
        .with_context(|| format!("failed to load loans from {}", loans_path))?
        .into_iter()
        .map(GroupLoan::from)
        .collect();
    log::info!("loaded {} loans", loans.len());

    let runner = ScenarioRunner::new();
    let start = Utc::now().date_naive();
    let grid = runner.run_group_grid(&loans, &extras, start);

    let mut out: Box<dyn Write> = match output_path {
        Some(path) => Box::new(File::create(path).with_context(|| format!("failed to create {}", path))?),
        None => Box::new(io::stdout()),
    };

    write_summary(&mut out, &grid)?;

    if let Some(path) = output_path {
        log::info!("results written to {}", path);
    }
    Ok(())
}

/// CSV summary, one row per `(policy, extra)` run; unreachable runs leave the
/// result columns empty
fn write_summary<W: Write>(out: &mut W, grid: &[(f64, MultiLoanResult)]) -> io::Result<()> {
    writeln!(out, "policy,extra_monthly,months,total_interest,payoff_date")?;
    for (extra, result) in grid {
        match &result.overall {
            GroupPayoff::Finite {
                term_months,
                total_interest_paid,
                payoff_date,
            } => writeln!(
                out,
                "{},{:.2},{},{:.2},{}",
                result.policy, extra, term_months, total_interest_paid, payoff_date
            )?,
            GroupPayoff::Unreachable => writeln!(out, "{},{:.2},,,", result.policy, extra)?,
        }
    }
    Ok(())
}

fn parse_extras(list: &str) -> Result<Vec<f64>> {
    list.split(',')
        .map(|s| s.trim().parse::<f64>().with_context(|| format!("invalid extra amount: {}", s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use liability_engine::loan::LoanTerms;

    #[test]
    fn test_summary_is_pure_csv() {
        let loans = vec![
            GroupLoan::new("car", LoanTerms::with_term(12_000.0, 6.0, 48)),
            GroupLoan::new("stuck", LoanTerms::with_installment(50_000.0, 24.0, 100.0)),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let grid = ScenarioRunner::new().run_group_grid(&loans, &[0.0, 200.0], start);

        let mut buffer = Vec::new();
        write_summary(&mut buffer, &grid).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "policy,extra_monthly,months,total_interest,payoff_date");
        assert_eq!(lines.len(), 1 + grid.len());
        assert!(lines[1..].iter().all(|line| line.split(',').count() == 5));
        assert_eq!(lines[1], "weighted,0.00,,,");
    }

    #[test]
    fn test_parse_extras() {
        assert_eq!(parse_extras("0, 100,250.5").unwrap(), vec![0.0, 100.0, 250.5]);
        assert!(parse_extras("100,abc").is_err());
    }
}
