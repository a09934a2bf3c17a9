//! Joint payoff projection for a set of loans sharing an extra-payment pool
//!
//! Every loan pays its own installment each month. On top of that a shared
//! pool is distributed across the loans that still need more than their
//! installment to clear. The pool is the caller's monthly extra plus, when
//! rollover is enabled, the installments of loans that have already finished.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::loan::{LoanId, LoanTerms};
use super::engine::ProjectionConfig;
use super::schedule::{add_months, AmortizationResult, AmortizationSchedule, MonthEntry};
use super::state::LoanState;
use super::monthly_rate;

/// Priority order for the shared extra pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Highest `outstanding balance × annual rate` first
    #[default]
    Weighted,
    /// Highest annual rate first, larger balance breaking ties
    Avalanche,
}

impl AllocationPolicy {
    pub const ALL: [AllocationPolicy; 2] = [AllocationPolicy::Weighted, AllocationPolicy::Avalanche];

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationPolicy::Weighted => "weighted",
            AllocationPolicy::Avalanche => "avalanche",
        }
    }

    /// Ordering of two loans, higher priority first
    fn compare(&self, a: &Track, b: &Track) -> Ordering {
        match self {
            AllocationPolicy::Weighted => {
                let wa = a.state.balance * a.annual_rate_percent;
                let wb = b.state.balance * b.annual_rate_percent;
                wb.total_cmp(&wa)
            }
            AllocationPolicy::Avalanche => b
                .annual_rate_percent
                .total_cmp(&a.annual_rate_percent)
                .then_with(|| b.state.balance.total_cmp(&a.state.balance)),
        }
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weighted" => Ok(AllocationPolicy::Weighted),
            "avalanche" => Ok(AllocationPolicy::Avalanche),
            other => Err(format!("unknown allocation policy: {}", other)),
        }
    }
}

/// A loan taking part in a group projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupLoan {
    pub id: LoanId,
    pub terms: LoanTerms,
}

impl GroupLoan {
    pub fn new(id: impl Into<String>, terms: LoanTerms) -> Self {
        Self {
            id: LoanId::new(id),
            terms,
        }
    }
}

impl From<(LoanId, LoanTerms)> for GroupLoan {
    fn from((id, terms): (LoanId, LoanTerms)) -> Self {
        Self { id, terms }
    }
}

/// Per-loan outcome of a group projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProjection {
    pub id: LoanId,
    pub result: AmortizationResult,
    /// Cumulative extra this loan absorbed from the shared pool
    pub extra_received: f64,
}

/// Totals across the whole group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupPayoff {
    Finite {
        /// Month the last loan finishes
        term_months: u32,
        total_interest_paid: f64,
        payoff_date: NaiveDate,
    },
    Unreachable,
}

impl GroupPayoff {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, GroupPayoff::Unreachable)
    }

    pub fn term_months(&self) -> Option<u32> {
        match self {
            GroupPayoff::Finite { term_months, .. } => Some(*term_months),
            GroupPayoff::Unreachable => None,
        }
    }

    pub fn total_interest_paid(&self) -> Option<f64> {
        match self {
            GroupPayoff::Finite { total_interest_paid, .. } => Some(*total_interest_paid),
            GroupPayoff::Unreachable => None,
        }
    }
}

/// Result of a group projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLoanResult {
    /// Policy the pool was distributed with
    pub policy: AllocationPolicy,
    pub loans: Vec<LoanProjection>,
    pub overall: GroupPayoff,
}

impl MultiLoanResult {
    pub fn loan(&self, id: &LoanId) -> Option<&LoanProjection> {
        self.loans.iter().find(|l| &l.id == id)
    }

    pub fn total_extra_received(&self) -> f64 {
        self.loans.iter().map(|l| l.extra_received).sum()
    }
}

/// Simulation bookkeeping for one loan
#[derive(Debug, Clone)]
struct Track {
    annual_rate_percent: f64,
    monthly_rate: f64,
    installment: f64,
    state: LoanState,
    schedule: Vec<MonthEntry>,
    /// Month the loan was retired (0 = paid off before the first month)
    finished: Option<u32>,
    /// Cannot cover its interest even with the whole pool
    hopeless: bool,
}

impl Track {
    fn is_active(&self) -> bool {
        self.finished.is_none() && !self.hopeless
    }
}

/// Project a set of loans paid simultaneously, sharing `total_extra_monthly`.
///
/// A loan that cannot cover its first month's interest even with the largest
/// pool it could ever receive is reported `Unreachable` and left out of the
/// simulation. Loans still open at `config.max_months` are `Unreachable` too,
/// and any unreachable loan makes the group total unreachable.
pub fn project_group(
    loans: &[GroupLoan],
    total_extra_monthly: f64,
    start_date: NaiveDate,
    config: &ProjectionConfig,
) -> MultiLoanResult {
    let total_extra_monthly = total_extra_monthly.max(0.0);
    let policy = config.allocation;

    let mut tracks: Vec<Track> = loans
        .iter()
        .map(|loan| {
            let annual_rate_percent = loan.terms.annual_rate_percent.max(0.0);
            let principal = loan.terms.principal;
            Track {
                annual_rate_percent,
                monthly_rate: monthly_rate(annual_rate_percent),
                installment: loan.terms.resolved_installment().max(0.0),
                state: LoanState::opening(principal),
                schedule: Vec::new(),
                finished: if principal > 0.0 { None } else { Some(0) },
                hopeless: false,
            }
        })
        .collect();

    let all_installments: f64 = tracks.iter().map(|t| t.installment).sum();
    for track in tracks.iter_mut().filter(|t| t.finished.is_none()) {
        let largest_pool = if config.roll_over_finished_installments {
            total_extra_monthly + all_installments - track.installment
        } else {
            total_extra_monthly
        };
        if track.installment + largest_pool <= track.state.interest_due(track.monthly_rate) {
            track.hopeless = true;
        }
    }

    for (loan, track) in loans.iter().zip(&tracks) {
        if track.hopeless {
            log::debug!("loan {} cannot cover its interest with the whole pool: unreachable", loan.id);
        }
    }

    let mut month = 0;
    while month < config.max_months && tracks.iter().any(Track::is_active) {
        month += 1;

        let pool = monthly_pool(&tracks, total_extra_monthly, config.roll_over_finished_installments);
        let extras = allocate_pool(&tracks, pool, policy);

        tracks = tracks
            .into_iter()
            .zip(extras)
            .map(|(track, extra)| step(track, extra, month))
            .collect();

        for (loan, track) in loans.iter().zip(&tracks) {
            if track.finished == Some(month) {
                log::debug!("loan {} paid off in month {}", loan.id, month);
            }
        }
    }

    if tracks.iter().any(Track::is_active) {
        log::warn!(
            "{} loans still open after {} months: unreachable",
            tracks.iter().filter(|t| t.is_active()).count(),
            config.max_months
        );
    }

    let loans: Vec<LoanProjection> = loans
        .iter()
        .zip(tracks)
        .map(|(loan, track)| LoanProjection {
            id: loan.id.clone(),
            extra_received: track.state.total_extra_received,
            result: loan_result(track, start_date),
        })
        .collect();

    let overall = group_payoff(&loans, start_date);

    MultiLoanResult { policy, loans, overall }
}

/// Pool available this month: the caller's extra plus freed installments
fn monthly_pool(tracks: &[Track], total_extra_monthly: f64, roll_over: bool) -> f64 {
    if !roll_over {
        return total_extra_monthly;
    }
    let freed: f64 = tracks
        .iter()
        .filter(|t| t.finished.is_some())
        .map(|t| t.installment)
        .sum();
    total_extra_monthly + freed
}

/// Extra assigned to each track this month, in track order.
///
/// Loans are served in policy order, each receiving up to what it needs
/// beyond its own installment, until the pool runs out.
fn allocate_pool(tracks: &[Track], pool: f64, policy: AllocationPolicy) -> Vec<f64> {
    let mut extras = vec![0.0; tracks.len()];

    let mut order: Vec<usize> = (0..tracks.len())
        .filter(|&i| tracks[i].is_active())
        .filter(|&i| tracks[i].state.extra_needed(tracks[i].monthly_rate, tracks[i].installment) > 0.0)
        .collect();
    order.sort_by(|&a, &b| policy.compare(&tracks[a], &tracks[b]));

    let mut remaining = pool;
    for i in order {
        if remaining <= 0.0 {
            break;
        }
        let need = tracks[i].state.extra_needed(tracks[i].monthly_rate, tracks[i].installment);
        let given = need.min(remaining);
        extras[i] = given;
        remaining -= given;
    }

    extras
}

/// Advance one track by a month, producing its next bookkeeping
fn step(track: Track, extra: f64, month: u32) -> Track {
    if !track.is_active() {
        return track;
    }

    let (state, entry) = track.state.advance(track.monthly_rate, track.installment, extra);
    let mut schedule = track.schedule;
    schedule.push(entry);

    Track {
        finished: if state.is_paid_off() { Some(month) } else { None },
        state,
        schedule,
        ..track
    }
}

fn loan_result(track: Track, start_date: NaiveDate) -> AmortizationResult {
    match track.finished {
        Some(0) => AmortizationResult::Finite(AmortizationSchedule::paid_off(start_date)),
        Some(term) => match add_months(start_date, term) {
            Some(payoff_date) => AmortizationResult::Finite(AmortizationSchedule {
                term_months: term,
                total_interest_paid: track.state.total_interest_paid,
                payoff_date,
                schedule: track.schedule,
            }),
            None => AmortizationResult::Unreachable,
        },
        None => AmortizationResult::Unreachable,
    }
}

fn group_payoff(loans: &[LoanProjection], start_date: NaiveDate) -> GroupPayoff {
    let mut term_months = 0;
    let mut total_interest_paid = 0.0;

    for loan in loans {
        match &loan.result {
            AmortizationResult::Finite(schedule) => {
                term_months = term_months.max(schedule.term_months);
                total_interest_paid += schedule.total_interest_paid;
            }
            AmortizationResult::Unreachable => return GroupPayoff::Unreachable,
        }
    }

    match add_months(start_date, term_months) {
        Some(payoff_date) => GroupPayoff::Finite {
            term_months,
            total_interest_paid,
            payoff_date,
        },
        None => GroupPayoff::Unreachable,
    }
}
