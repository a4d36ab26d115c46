//! Where receipts live and how large they may be.

use std::path::PathBuf;

use splitledger_shared::config::StorageSettings;

/// Backend that receipt files are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// A directory on the local filesystem.
    LocalFs {
        /// Receipts directory.
        root: PathBuf,
    },
    /// Process memory; contents vanish with the process.
    Memory,
}

impl StorageProvider {
    /// Filesystem backend rooted at `root`.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Short name used in log fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LocalFs { .. } => "fs",
            Self::Memory => "memory",
        }
    }
}

/// Receipt storage settings resolved for a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Backend.
    pub provider: StorageProvider,
    /// Largest accepted receipt, in bytes.
    pub max_file_size: u64,
}

impl StorageConfig {
    /// 10 MiB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Settings for `provider` with the default size limit.
    #[must_use]
    pub const fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Overrides the size limit.
    #[must_use]
    pub const fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }
}

impl From<&StorageSettings> for StorageConfig {
    fn from(settings: &StorageSettings) -> Self {
        Self::new(StorageProvider::local_fs(&settings.receipts_dir))
            .with_max_file_size(settings.max_file_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_uses_receipts_dir() {
        let settings = StorageSettings {
            receipts_dir: "./receipts".to_string(),
            max_file_size: 512,
        };

        let config = StorageConfig::from(&settings);
        assert_eq!(config.provider, StorageProvider::local_fs("./receipts"));
        assert_eq!(config.provider.name(), "fs");
        assert_eq!(config.max_file_size, 512);
    }

    #[test]
    fn test_default_limit() {
        let config = StorageConfig::new(StorageProvider::Memory);
        assert_eq!(config.max_file_size, StorageConfig::DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.with_max_file_size(16).max_file_size, 16);
    }
}
