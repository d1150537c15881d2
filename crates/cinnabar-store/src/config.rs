//! Store configuration.
//!
//! [`StoreConfig`] names the data directory and the two store files, and
//! carries the durability and overwrite-reservation knobs. It can be built
//! programmatically or loaded from TOML; fields left out of the TOML fall
//! back to their defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Result, StoreError};

/// Default index file name.
pub const DEFAULT_INDEX_FILE_NAME: &str = "index.txt";

/// Default data file name.
pub const DEFAULT_DATA_FILE_NAME: &str = "data.bin";

/// Configuration for opening a [`Store`](crate::Store).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory holding the index, data, and sidecar files. Required;
    /// created on open if missing. `.` is permitted.
    pub data_dir: PathBuf,

    /// Name of the human-readable index file inside `data_dir`.
    pub index_file_name: String,

    /// Name of the binary data file inside `data_dir`.
    pub data_file_name: String,

    /// When true, every write is fsynced before the call returns. Durable,
    /// and roughly an order of magnitude slower.
    pub sync_write: bool,

    /// Reservation for in-place overwrites: a first extern write of N bytes
    /// reserves `(N * percent) / 100` extra padding bytes. Zero disables
    /// reservation.
    pub overwrite_expand_percent: u32,
}

impl StoreConfig {
    /// Creates a configuration for `data_dir` with default file names, no
    /// sync-on-write, and no overwrite reservation.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| StoreError::Config {
            reason: e.to_string(),
        })
    }

    /// Checks the configuration for use by [`Store::open`](crate::Store::open).
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(StoreError::Config {
                reason: "data_dir must not be empty".to_string(),
            });
        }
        if self.index_file_name.is_empty() {
            return Err(StoreError::Config {
                reason: "index_file_name must not be empty".to_string(),
            });
        }
        if self.data_file_name.is_empty() {
            return Err(StoreError::Config {
                reason: "data_file_name must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            index_file_name: DEFAULT_INDEX_FILE_NAME.to_string(),
            data_file_name: DEFAULT_DATA_FILE_NAME.to_string(),
            sync_write: false,
            overwrite_expand_percent: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_file_names() {
        let config = StoreConfig::new("/tmp/records");
        assert_eq!(config.index_file_name, "index.txt");
        assert_eq!(config.data_file_name, "data.bin");
        assert!(!config.sync_write);
        assert_eq!(config.overwrite_expand_percent, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn dot_data_dir_is_permitted() {
        assert!(StoreConfig::new(".").validate().is_ok());
    }

    #[test]
    fn empty_data_dir_is_rejected() {
        let err = StoreConfig::default().validate().unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }), "got {err:?}");
    }

    #[test]
    fn from_toml_with_partial_fields() {
        let config = StoreConfig::from_toml_str(
            r#"
            data_dir = "records"
            sync_write = true
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("records"));
        assert!(config.sync_write);
        assert_eq!(config.index_file_name, "index.txt");
    }

    #[test]
    fn from_toml_rejects_unknown_fields() {
        let err = StoreConfig::from_toml_str("data_dir = \"x\"\nbogus = 1\n").unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }), "got {err:?}");
    }

    #[test]
    fn empty_file_names_are_rejected() {
        let mut config = StoreConfig::new("records");
        config.index_file_name = String::new();
        assert!(config.validate().is_err());

        let mut config = StoreConfig::new("records");
        config.data_file_name = String::new();
        assert!(config.validate().is_err());
    }
}
