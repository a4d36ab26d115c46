//! Receipt storage errors.

use thiserror::Error;

/// Failures while storing or reading receipt files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The upload is larger than `max_file_size`.
    #[error("Receipt is {size} bytes, the limit is {max} bytes")]
    FileTooLarge {
        /// Upload size in bytes.
        size: u64,
        /// Configured limit in bytes.
        max: u64,
    },

    /// No file is stored under this name.
    #[error("Receipt file missing: {name}")]
    NotFound {
        /// Generated receipt filename.
        name: String,
    },

    /// Uploaded filename has nothing usable left after sanitizing.
    #[error("Invalid file name: {0:?}")]
    InvalidFilename(String),

    /// The backend could not be built from the configuration.
    #[error("Receipt storage misconfigured: {0}")]
    Configuration(String),

    /// Any other OpenDAL failure.
    #[error("Receipt storage failed: {0}")]
    Backend(#[from] opendal::Error),
}

impl StorageError {
    /// Shorthand for [`StorageError::FileTooLarge`].
    #[must_use]
    pub const fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Shorthand for [`StorageError::NotFound`].
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Shorthand for [`StorageError::Configuration`].
    #[must_use]
    pub fn configuration(msg: impl ToString) -> Self {
        Self::Configuration(msg.to_string())
    }
}
