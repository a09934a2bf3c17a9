//! New `amount_repaid` values after a payment is added, edited or deleted
//!
//! Each function takes the liability as currently stored and the full,
//! sorted payment history as it stood *before* the change. Results are
//! clamped into `[0, initial_amount]`.

use crate::loan::{sort_payments, Liability, PaymentEvent, PaymentId};
use super::replay::{principal_component_of, validate_history, ReplayError};

/// `amount_repaid` after deleting `payment_id` from `history`
pub fn amount_repaid_after_delete(
    liability: &Liability,
    history: &[PaymentEvent],
    payment_id: &PaymentId,
) -> Result<f64, ReplayError> {
    let component = principal_component_of(liability, history, payment_id)?;
    Ok(liability.clamp_repaid(liability.amount_repaid - component))
}

/// `amount_repaid` after replacing the payment with `edited.id` by `edited`.
///
/// The old component comes from the current history; the new one from the
/// history with the edited payment moved to its new position.
pub fn amount_repaid_after_edit(
    liability: &Liability,
    history: &[PaymentEvent],
    edited: &PaymentEvent,
) -> Result<f64, ReplayError> {
    let old_component = principal_component_of(liability, history, &edited.id)?;

    let mut updated: Vec<PaymentEvent> = history
        .iter()
        .map(|p| if p.id == edited.id { edited.clone() } else { p.clone() })
        .collect();
    sort_payments(&mut updated);
    let new_component = principal_component_of(liability, &updated, &edited.id)?;

    Ok(liability.clamp_repaid(liability.amount_repaid - old_component + new_component))
}

/// `amount_repaid` after recording `added` into `history`.
///
/// `history` must already be a valid replay order and must not contain
/// `added.id`.
pub fn amount_repaid_after_add(
    liability: &Liability,
    history: &[PaymentEvent],
    added: &PaymentEvent,
) -> Result<f64, ReplayError> {
    validate_history(history)?;
    if history.iter().any(|p| p.id == added.id) {
        log::warn!("payment {} is already recorded", added.id);
        return Err(ReplayError::DuplicatePaymentId { id: added.id.clone() });
    }

    let mut updated = history.to_vec();
    updated.push(added.clone());
    sort_payments(&mut updated);

    let component = principal_component_of(liability, &updated, &added.id)?;
    Ok(liability.clamp_repaid(liability.amount_repaid + component))
}
