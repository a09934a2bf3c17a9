//! Replay a liability's payment history from origination
//!
//! The principal a past payment retired depends on every payment before it,
//! so it is recovered by walking the history from the original principal,
//! decomposing each payment against the balance outstanding at that point.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amortization::{decompose, Decomposition};
use crate::loan::{Liability, PaymentEvent, PaymentId};

/// Caller contract violations detected while replaying
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayError {
    #[error("payment {0} is not in the supplied history")]
    TargetNotFound(PaymentId),

    #[error("history out of order at index {index}: {previous} is ordered after {next}")]
    OutOfOrder {
        index: usize,
        previous: PaymentId,
        next: PaymentId,
    },

    #[error("payment {id} at index {index} shares date and sequence key with its predecessor")]
    DuplicateOrderingKey { index: usize, id: PaymentId },

    #[error("payment {id} has a non-positive amount")]
    NonPositiveAmount { id: PaymentId },

    #[error("payment id {id} appears more than once in the history")]
    DuplicatePaymentId { id: PaymentId },
}

/// One payment as seen during replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayedPayment {
    pub id: PaymentId,
    pub outstanding_before: f64,
    pub decomposition: Decomposition,
    pub outstanding_after: f64,
}

/// Check that a history is strictly ascending by `(date, sequence_key)`,
/// that every amount is positive and that no payment id repeats.
pub fn validate_history(payments: &[PaymentEvent]) -> Result<(), ReplayError> {
    let mut seen: HashSet<&PaymentId> = HashSet::with_capacity(payments.len());

    for (index, payment) in payments.iter().enumerate() {
        if !(payment.amount > 0.0) {
            return Err(ReplayError::NonPositiveAmount { id: payment.id.clone() });
        }
        if !seen.insert(&payment.id) {
            return Err(ReplayError::DuplicatePaymentId { id: payment.id.clone() });
        }
        if index == 0 {
            continue;
        }

        let previous = &payments[index - 1];
        match previous.ordering_key().cmp(&payment.ordering_key()) {
            std::cmp::Ordering::Less => {}
            std::cmp::Ordering::Equal => {
                return Err(ReplayError::DuplicateOrderingKey {
                    index,
                    id: payment.id.clone(),
                })
            }
            std::cmp::Ordering::Greater => {
                return Err(ReplayError::OutOfOrder {
                    index,
                    previous: previous.id.clone(),
                    next: payment.id.clone(),
                })
            }
        }
    }
    Ok(())
}

/// Split one payment against the balance outstanding before it.
///
/// Without a configured rate the whole payment is principal.
fn split(liability: &Liability, outstanding: f64, amount: f64) -> Decomposition {
    match liability.annual_rate_percent {
        Some(rate) => decompose(outstanding, rate, amount),
        None => Decomposition::all_principal(amount),
    }
}

/// Walk `payments` in order from the liability's original principal,
/// calling `visit` with each replayed payment. Stops early when `visit`
/// returns `false`.
fn walk<F>(liability: &Liability, payments: &[PaymentEvent], mut visit: F)
where
    F: FnMut(ReplayedPayment) -> bool,
{
    let mut outstanding = liability.initial_amount.max(0.0);

    for payment in payments {
        let decomposition = split(liability, outstanding, payment.amount);
        let outstanding_after = (outstanding - decomposition.principal_paid).max(0.0);

        let keep_going = visit(ReplayedPayment {
            id: payment.id.clone(),
            outstanding_before: outstanding,
            decomposition,
            outstanding_after,
        });
        if !keep_going {
            return;
        }

        outstanding = outstanding_after;
    }
}

/// Replay the whole history, returning every payment's decomposition.
pub fn replay_history(liability: &Liability, payments: &[PaymentEvent]) -> Result<Vec<ReplayedPayment>, ReplayError> {
    validate_history(payments).inspect_err(|e| log::warn!("rejecting payment history: {}", e))?;

    let mut replayed = Vec::with_capacity(payments.len());
    walk(liability, payments, |step| {
        replayed.push(step);
        true
    });
    Ok(replayed)
}

/// Principal attributed to `target` when the history is replayed in order.
///
/// This is the amount to back out of `amount_repaid` when the payment is
/// deleted, or to replace when it is edited.
pub fn principal_component_of(
    liability: &Liability,
    payments: &[PaymentEvent],
    target: &PaymentId,
) -> Result<f64, ReplayError> {
    validate_history(payments).inspect_err(|e| log::warn!("rejecting payment history: {}", e))?;

    let mut found = None;
    walk(liability, payments, |step| {
        if &step.id == target {
            found = Some(step.decomposition.principal_paid);
            false
        } else {
            true
        }
    });

    found.ok_or_else(|| {
        log::warn!("payment {} not found in history of {} payments", target, payments.len());
        ReplayError::TargetNotFound(target.clone())
    })
}
