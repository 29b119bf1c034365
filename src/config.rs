//! Configuration for PageKV
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::source::ReadAt;

// =============================================================================
// Writer Configuration
// =============================================================================

/// Controls how the exporter lays rows out into pages
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Target encoded size of a data page in each column.
    /// The column writer cuts a page once it reaches this size.
    pub page_size_bytes: usize,

    /// Hard cap on rows per page, regardless of byte size
    pub max_rows_per_page: usize,

    /// Recorded as `created_by` in the parquet footer
    pub created_by: String,

    /// Index type written to the sidecar metadata by `export_to_dir`
    pub index_type: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            page_size_bytes: 64 * 1024, // 64 KB
            max_rows_per_page: 20_000,
            created_by: format!("pagekv {}", crate::VERSION),
            index_type: "upside_down".to_string(),
        }
    }
}

impl WriterConfig {
    /// Create a new config builder
    pub fn builder() -> WriterConfigBuilder {
        WriterConfigBuilder::default()
    }
}

/// Builder for WriterConfig
#[derive(Default)]
pub struct WriterConfigBuilder {
    config: WriterConfig,
}

impl WriterConfigBuilder {
    /// Set the target page size (in bytes)
    pub fn page_size_bytes(mut self, size: usize) -> Self {
        self.config.page_size_bytes = size.max(1);
        self
    }

    /// Set the maximum number of rows per page
    pub fn max_rows_per_page(mut self, rows: usize) -> Self {
        self.config.max_rows_per_page = rows.max(1);
        self
    }

    /// Set the creator string stored in the parquet footer
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.config.created_by = created_by.into();
        self
    }

    /// Set the index type written to the sidecar
    pub fn index_type(mut self, index_type: impl Into<String>) -> Self {
        self.config.index_type = index_type.into();
        self
    }

    pub fn build(self) -> WriterConfig {
        self.config
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// An already-open random-access source and its length in bytes
#[derive(Clone)]
pub struct ReaderSource {
    pub source: Arc<dyn ReadAt>,
    pub len: u64,
}

impl fmt::Debug for ReaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderSource")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Where a store reads its container from
#[derive(Debug, Clone)]
pub enum StoreSource {
    /// Open the container at a filesystem path
    Path(PathBuf),

    /// Use an already-open source
    Reader(ReaderSource),
}

/// Store construction options.
///
/// Exactly one of `path` or `reader` must be supplied.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Filesystem path of the container file
    pub path: Option<PathBuf>,

    /// Already-open source plus its length in bytes
    pub reader: Option<ReaderSource>,
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Config for a container that is already open
    pub fn for_reader(source: Arc<dyn ReadAt>, len: u64) -> Self {
        Self::builder().reader(source, len).build()
    }

    /// Config for a container on disk
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self::builder().path(path).build()
    }

    /// Resolve the options into a single source
    pub fn source(&self) -> std::result::Result<StoreSource, ConfigError> {
        match (&self.path, &self.reader) {
            (Some(_), Some(_)) => Err(ConfigError::Ambiguous),
            (None, None) => Err(ConfigError::Missing),
            (Some(path), None) => {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::EmptyPath);
                }
                Ok(StoreSource::Path(path.clone()))
            }
            (None, Some(reader)) => Ok(StoreSource::Reader(reader.clone())),
        }
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Open the container from a filesystem path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = Some(path.into());
        self
    }

    /// Open the container from an already-open source of `len` bytes
    pub fn reader(mut self, source: Arc<dyn ReadAt>, len: u64) -> Self {
        self.config.reader = Some(ReaderSource { source, len });
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
