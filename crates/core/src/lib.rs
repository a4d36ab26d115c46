//! Core business logic for SplitLedger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Splitting rules, share validation and balance math live here; persistence
//! is reached only through traits the db crate implements.
//!
//! # Modules
//!
//! - `split` - Equal-split allocation and share reconciliation
//! - `balance` - Net balances per user across a group's expenses
//! - `storage` - Receipt file storage (OpenDAL)
//! - `receipt` - Attaching receipt files to expenses

pub mod balance;
pub mod receipt;
pub mod split;
pub mod storage;

