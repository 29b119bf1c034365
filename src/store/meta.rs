//! Sidecar index metadata
//!
//! A small JSON record written next to the container so a downstream
//! opener can tell which store implementation the directory needs.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};

/// Storage kind recorded in the sidecar
pub const STORE_NAME: &str = "pagekv";

/// Container file name inside an export directory
pub const STORE_FILENAME: &str = "store";

/// Sidecar file name inside an export directory
pub const META_FILENAME: &str = "index_meta.json";

/// Contents of `index_meta.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub storage: String,
    pub index_type: String,
}

impl IndexMeta {
    /// Metadata for a directory holding this store kind
    pub fn new(index_type: impl Into<String>) -> Self {
        Self {
            storage: STORE_NAME.to_string(),
            index_type: index_type.into(),
        }
    }

    /// Write `dir/index_meta.json`
    pub fn write(&self, dir: &Path) -> io::Result<()> {
        let json = serde_json::to_vec(self)?;
        fs::write(dir.join(META_FILENAME), json)
    }

    /// Read `dir/index_meta.json`
    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join(META_FILENAME);
        let raw = fs::read(&path)?;
        serde_json::from_slice(&raw).map_err(|e| {
            Error::Config(ConfigError::InvalidMeta {
                path,
                reason: e.to_string(),
            })
        })
    }

    /// Fail unless the sidecar names this store kind
    pub fn check_storage(&self) -> std::result::Result<(), ConfigError> {
        if self.storage != STORE_NAME {
            return Err(ConfigError::StorageMismatch {
                expected: STORE_NAME.to_string(),
                found: self.storage.clone(),
            });
        }
        Ok(())
    }
}
