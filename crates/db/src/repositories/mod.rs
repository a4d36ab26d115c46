//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Cascading deletes are explicit transactional routines here rather than
//! foreign-key actions.

pub mod balance;
pub mod expense;
pub mod group;
pub mod membership;
pub mod receipt;
pub mod user;

pub use balance::{BalanceError, BalanceRepository, BalanceWithUser};
pub use expense::{
    CreateExpenseInput, ExpenseError, ExpenseRepository, ExpenseWithShares, UpdateExpenseInput,
};
pub use group::{GroupError, GroupRepository};
pub use membership::{MemberWithUser, MembershipError, MembershipRepository};
pub use receipt::ReceiptRepository;
pub use user::{CreateUserInput, UpdateUserInput, UserError, UserRepository};
