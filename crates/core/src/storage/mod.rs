//! Receipt file storage using Apache OpenDAL.
//!
//! Receipts live in a flat namespace of generated names (`<uuid-hex><ext>`);
//! the database only records the name and MIME type.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               Apache OpenDAL                 │
//! ├──────────────────────────────────────────────┤
//! │ op.write(name, bytes)  │ op.read(name)       │
//! │ op.delete(name)        │ op.stat(name)       │
//! └──────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{ReceiptStorage, sanitize_filename};
