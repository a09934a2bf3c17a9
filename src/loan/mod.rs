//! Loan, liability and payment-history data structures and loading

mod data;
pub mod loader;

pub use data::{Liability, LoanId, LoanTerms, PaymentEvent, PaymentId, sort_payments};
pub use loader::{
    LoadError, load_group_loans, load_group_loans_from_reader, load_payment_history,
    load_payment_history_from_reader, load_projection_config,
};
