//! Receipt storage implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Storage for receipt files.
#[derive(Debug, Clone)]
pub struct ReceiptStorage {
    operator: Operator,
    config: StorageConfig,
}

impl ReceiptStorage {
    /// Create a new receipt storage from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                Ok(Operator::new(services::Fs::default().root(root))
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::Memory => Ok(Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish()),
        }
    }

    /// Validate an upload against the size limit.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileTooLarge`] when `size` exceeds the limit.
    pub fn validate_upload(&self, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }
        Ok(())
    }

    /// Generate a fresh storage name for an uploaded file.
    ///
    /// Format: `{uuid-hex}{lowercased extension}`. The extension is taken
    /// from the sanitized original name, so `Scan 01.JPG` yields a `.jpg`
    /// name and `notes` yields a bare hex name.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidFilename`] if nothing usable remains
    /// of `original` after sanitizing.
    pub fn generate_filename(original: &str) -> Result<String, StorageError> {
        let sanitized = sanitize_filename(original);
        if sanitized.is_empty() {
            return Err(StorageError::InvalidFilename(original.to_string()));
        }

        let extension = match sanitized.rfind('.') {
            Some(idx) if idx > 0 => sanitized[idx..].to_ascii_lowercase(),
            _ => String::new(),
        };

        Ok(format!("{}{extension}", Uuid::new_v4().simple()))
    }

    /// Validate and store an uploaded file, returning its generated name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is too large, its name is unusable, or
    /// the write fails.
    pub async fn save(
        &self,
        original: &str,
        bytes: impl Into<Bytes>,
    ) -> Result<String, StorageError> {
        let bytes: Bytes = bytes.into();
        self.validate_upload(bytes.len() as u64)?;
        let name = Self::generate_filename(original)?;

        self.operator.write(&name, bytes).await?;
        debug!(name = %name, provider = self.config.provider.name(), "Receipt stored");
        Ok(name)
    }

    /// Read a stored file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the file does not exist.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        match self.operator.read(name).await {
            Ok(buffer) => Ok(buffer.to_vec()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::not_found(name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a file exists in storage.
    pub async fn exists(&self, name: &str) -> bool {
        self.operator.stat(name).await.is_ok()
    }

    /// Delete a file from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        self.operator.delete(name).await.map_err(StorageError::from)
    }

    /// Delete a file, logging instead of failing.
    pub async fn remove_best_effort(&self, name: &str) {
        if let Err(e) = self.delete(name).await {
            warn!(name = %name, error = %e, "Failed to remove receipt file");
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Sanitize an uploaded filename.
///
/// Keeps only the final path component, replaces every character other than
/// ASCII alphanumerics, dots, hyphens and underscores with `_`, and strips
/// leading and trailing dots and underscores. May return an empty string.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();

    let replaced: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    replaced.trim_matches(['.', '_']).to_string()
}
