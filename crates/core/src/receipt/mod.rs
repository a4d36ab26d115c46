//! Receipt management for expenses.
//!
//! Each expense carries at most one receipt file. The service coordinates
//! the file store and the expense record:
//! - Attach (replaces any previous receipt)
//! - Download
//! - Remove

mod error;
mod service;

pub use error::ReceiptError;
pub use service::{ReceiptRef, ReceiptRepository, ReceiptService};
