//! `SeaORM` entities.

pub mod expense_shares;
pub mod expenses;
pub mod group_members;
pub mod groups;
pub mod users;
