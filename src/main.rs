//! Liability Engine CLI
//!
//! Command-line previews of installments, payoff projections and payment
//! history replay.
//!
//! Usage:
//!   liability-engine installment --principal 25000 --rate 7.5 --term 60
//!   liability-engine project --principal 25000 --rate 7.5 --term 60 --extra 100 --format csv
//!   liability-engine group --loans loans.csv --extra 300 --policy avalanche
//!   liability-engine replay --history payments.csv --initial 20000 --rate 9 --payment p2 --delete
//!   liability-engine scenarios --principal 25000 --rate 7.5 --installment 500 --extras 0,100,250

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use liability_engine::amortization::{
    compute_installment, project_group, project_with_config, AllocationPolicy, AmortizationResult, GroupLoan,
    ProjectionConfig,
};
use liability_engine::ledger::{amount_repaid_after_delete, principal_component_of, replay_history};
use liability_engine::loan::{load_group_loans, load_payment_history, load_projection_config, Liability, PaymentId};
use liability_engine::ScenarioRunner;

/// Amortization and ledger-reconciliation previews for consumer loans
#[derive(Parser, Debug)]
#[command(name = "liability-engine", version)]
struct Cli {
    /// JSON projection config (max_months, allocation, roll_over_finished_installments)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fixed monthly installment for a principal, rate and term
    Installment {
        #[arg(long)]
        principal: f64,
        /// Annual rate in percent
        #[arg(long, default_value = "0")]
        rate: f64,
        /// Term in months
        #[arg(long)]
        term: u32,
    },

    /// Payoff projection for a single loan
    Project {
        #[arg(long)]
        principal: f64,
        #[arg(long, default_value = "0")]
        rate: f64,
        /// Monthly installment (derived from --term when omitted)
        #[arg(long)]
        installment: Option<f64>,
        #[arg(long)]
        term: Option<u32>,
        /// Extra paid every month on top of the installment
        #[arg(long, default_value = "0")]
        extra: f64,
        /// Start date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Joint payoff projection for loans sharing an extra-payment pool
    Group {
        /// CSV with id,principal,annual_rate_percent,term_months,installment
        #[arg(long)]
        loans: PathBuf,
        #[arg(long, default_value = "0")]
        extra: f64,
        /// weighted or avalanche (overrides the config file)
        #[arg(long)]
        policy: Option<AllocationPolicy>,
        /// Keep finished loans' installments out of the pool
        #[arg(long)]
        no_rollover: bool,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Replay a liability's payment history
    Replay {
        /// CSV with id,amount,date,sequence_key
        #[arg(long)]
        history: PathBuf,
        /// Original principal
        #[arg(long)]
        initial: f64,
        /// Annual rate in percent; payments are all principal when omitted
        #[arg(long)]
        rate: Option<f64>,
        /// Stored amount repaid (the full replay total when omitted)
        #[arg(long)]
        repaid: Option<f64>,
        /// Payment to report on; prints the whole replay when omitted
        #[arg(long)]
        payment: Option<String>,
        /// Print the amount repaid after deleting --payment
        #[arg(long, requires = "payment")]
        delete: bool,
    },

    /// Compare extra monthly amounts against paying the installment alone
    Scenarios {
        #[arg(long)]
        principal: f64,
        #[arg(long, default_value = "0")]
        rate: f64,
        #[arg(long)]
        installment: f64,
        /// Comma-separated extra amounts
        #[arg(long, value_delimiter = ',', required = true)]
        extras: Vec<f64>,
        #[arg(long)]
        start: Option<NaiveDate>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_projection_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ProjectionConfig::default(),
    };

    match cli.command {
        Commands::Installment { principal, rate, term } => {
            println!("{:.2}", compute_installment(principal, rate, term));
        }
        Commands::Project {
            principal,
            rate,
            installment,
            term,
            extra,
            start,
            format,
        } => {
            let installment = match (installment, term) {
                (Some(installment), _) => installment,
                (None, Some(term)) => compute_installment(principal, rate, term),
                (None, None) => bail!("either --installment or --term is required"),
            };
            let start = start.unwrap_or_else(today);
            let result = project_with_config(&config, principal, rate, installment, extra, start);
            print_projection(&result, installment, format)?;
        }
        Commands::Group {
            loans,
            extra,
            policy,
            no_rollover,
            start,
            format,
        } => {
            let loans: Vec<GroupLoan> = load_group_loans(&loans)
                .with_context(|| format!("failed to load loans from {}", loans.display()))?
                .into_iter()
                .map(GroupLoan::from)
                .collect();

            let mut config = config;
            if let Some(policy) = policy {
                config.allocation = policy;
            }
            if no_rollover {
                config.roll_over_finished_installments = false;
            }

            let result = project_group(&loans, extra, start.unwrap_or_else(today), &config);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(io::stdout());
                    writer.write_record(["id", "term_months", "total_interest_paid", "payoff_date", "extra_received"])?;
                    for loan in &result.loans {
                        let (term, interest, payoff) = match loan.result.as_finite() {
                            Some(s) => (
                                s.term_months.to_string(),
                                format!("{:.2}", s.total_interest_paid),
                                s.payoff_date.to_string(),
                            ),
                            None => (String::new(), String::new(), String::new()),
                        };
                        let extra = format!("{:.2}", loan.extra_received);
                        writer.write_record([loan.id.as_str(), term.as_str(), interest.as_str(), payoff.as_str(), extra.as_str()])?;
                    }
                    writer.flush()?;
                }
                OutputFormat::Text => {
                    println!("Allocation policy: {}", result.policy);
                    println!("{:<16} {:>6} {:>14} {:>12} {:>14}", "Loan", "Months", "Interest", "Payoff", "Extra");
                    println!("{}", "-".repeat(66));
                    for loan in &result.loans {
                        match loan.result.as_finite() {
                            Some(s) => println!(
                                "{:<16} {:>6} {:>14.2} {:>12} {:>14.2}",
                                loan.id, s.term_months, s.total_interest_paid, s.payoff_date, loan.extra_received
                            ),
                            None => println!("{:<16} {:>6}", loan.id, "never"),
                        }
                    }
                    match (result.overall.term_months(), result.overall.total_interest_paid()) {
                        (Some(term), Some(interest)) => {
                            println!("\nAll loans paid off in {} months, total interest {:.2}", term, interest)
                        }
                        _ => println!("\nThese loans can never all be paid off with the current payments"),
                    }
                }
            }
        }
        Commands::Replay {
            history,
            initial,
            rate,
            repaid,
            payment,
            delete,
        } => {
            let payments = load_payment_history(&history)
                .with_context(|| format!("failed to load payments from {}", history.display()))?;

            let mut liability = Liability::new(initial, today());
            liability.annual_rate_percent = rate;

            let replayed = replay_history(&liability, &payments).context("invalid payment history")?;
            let total: f64 = replayed.iter().map(|p| p.decomposition.principal_paid).sum();
            liability.amount_repaid = liability.clamp_repaid(repaid.unwrap_or(total));

            match payment {
                Some(id) => {
                    let id = PaymentId::new(id);
                    if delete {
                        let after = amount_repaid_after_delete(&liability, &payments, &id)?;
                        println!("{:.2}", after);
                    } else {
                        println!("{:.2}", principal_component_of(&liability, &payments, &id)?);
                    }
                }
                None => {
                    println!("{:<12} {:>14} {:>12} {:>12} {:>14}", "Payment", "Before", "Interest", "Principal", "After");
                    println!("{}", "-".repeat(68));
                    for step in &replayed {
                        println!(
                            "{:<12} {:>14.2} {:>12.2} {:>12.2} {:>14.2}",
                            step.id,
                            step.outstanding_before,
                            step.decomposition.interest_paid,
                            step.decomposition.principal_paid,
                            step.outstanding_after
                        );
                    }
                    println!("\nAmount repaid: {:.2}", liability.amount_repaid);
                }
            }
        }
        Commands::Scenarios {
            principal,
            rate,
            installment,
            extras,
            start,
        } => {
            let runner = ScenarioRunner::with_config(config);
            let results =
                runner.run_extra_scenarios(principal, rate, installment, &extras, start.unwrap_or_else(today));

            println!("{:>10} {:>8} {:>14} {:>8} {:>14}", "Extra", "Months", "Interest", "Saved", "Int. saved");
            println!("{}", "-".repeat(58));
            for row in &results {
                match (row.result.as_finite(), row.months_saved, row.interest_saved) {
                    (Some(s), Some(months), Some(interest)) => println!(
                        "{:>10.2} {:>8} {:>14.2} {:>8} {:>14.2}",
                        row.extra_monthly, s.term_months, s.total_interest_paid, months, interest
                    ),
                    (Some(s), _, _) => println!(
                        "{:>10.2} {:>8} {:>14.2} {:>8} {:>14}",
                        row.extra_monthly, s.term_months, s.total_interest_paid, "-", "-"
                    ),
                    (None, _, _) => println!("{:>10.2} {:>8}", row.extra_monthly, "never"),
                }
            }
        }
    }

    Ok(())
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

fn print_projection(result: &AmortizationResult, installment: f64, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            for entry in result.schedule() {
                writer.serialize(entry)?;
            }
            writer.flush()?;
        }
        OutputFormat::Text => match result.as_finite() {
            None => println!("Installment {:.2} can never pay off this loan", installment),
            Some(schedule) => {
                println!("Installment:    {:.2}", installment);
                println!("Term:           {} months", schedule.term_months);
                println!("Total interest: {:.2}", schedule.total_interest_paid);
                println!("Payoff date:    {}", schedule.payoff_date);
                println!();
                println!("{:>5} {:>12} {:>12} {:>10} {:>14}", "Month", "Interest", "Principal", "Extra", "Balance");
                println!("{}", "-".repeat(57));
                for entry in schedule.schedule.iter().take(24) {
                    println!(
                        "{:>5} {:>12.2} {:>12.2} {:>10.2} {:>14.2}",
                        entry.month, entry.interest_paid, entry.principal_paid, entry.extra_applied, entry.remaining_balance
                    );
                }
                if schedule.schedule.len() > 24 {
                    println!("... ({} more months)", schedule.schedule.len() - 24);
                }
            }
        },
    }
    Ok(())
}
