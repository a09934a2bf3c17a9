//! Liability Engine - amortization and ledger reconciliation for consumer loans
//!
//! This library provides:
//! - Fixed installment calculation and interest/principal decomposition
//! - Single-loan payoff projections with optional extra payments
//! - Group projections sharing an extra-payment pool across loans
//! - Payment-history replay to keep a liability's `amount_repaid` consistent
//!   when recorded payments are edited or deleted
//!
//! Everything here is pure computation: no I/O happens outside the loaders.

pub mod loan;
pub mod amortization;
pub mod ledger;
pub mod scenario;

// Re-export commonly used types
pub use loan::{Liability, LoanId, LoanTerms, PaymentEvent, PaymentId};
pub use amortization::{
    compute_installment, decompose, project, project_group, AllocationPolicy, AmortizationResult, MultiLoanResult,
    ProjectionConfig,
};
pub use ledger::{principal_component_of, ReplayError};
pub use scenario::ScenarioRunner;
