//! Expense splitting.
//!
//! - `allocation` - equal split of an amount with no lost cents
//! - `reconcile` - validation and construction of an expense's share set
//! - `error` - validation errors shared by both

pub mod allocation;
pub mod error;
pub mod reconcile;

pub use allocation::{Allocation, allocate};
pub use error::SplitError;
pub use reconcile::{ReconcileMode, ShareInput, reconcile, validate_expense_amount};
