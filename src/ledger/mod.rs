//! Payment-history replay and `amount_repaid` reconciliation

mod replay;
pub mod adjust;

pub use replay::{principal_component_of, replay_history, validate_history, ReplayError, ReplayedPayment};
pub use adjust::{amount_repaid_after_add, amount_repaid_after_delete, amount_repaid_after_edit};
