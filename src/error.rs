//! Error types for PageKV
//!
//! One enum per failure domain, plus a unified error for the store surface.
//! "Not found" is never an error: lookups return `Ok(None)` and cursors
//! simply become invalid.

use std::io;
use std::path::PathBuf;

use parquet::errors::ParquetError;
use thiserror::Error;

/// Result type alias using the unified [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by an export source
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Missing or ambiguous store construction options
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("must specify either a path or a reader with its size")]
    Missing,

    #[error("both a path and a reader were specified; pick one")]
    Ambiguous,

    #[error("path must not be empty")]
    EmptyPath,

    #[error("storage kind mismatch: expected {expected}, found {found}")]
    StorageMismatch { expected: String, found: String },

    #[error("invalid index metadata in {path}: {reason}")]
    InvalidMeta { path: PathBuf, reason: String },
}

// =============================================================================
// Open Errors
// =============================================================================

/// Structural problems detected while opening a container
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed container: {0}")]
    Malformed(String),

    #[error("container has no row group")]
    Empty,
}

impl From<ParquetError> for OpenError {
    /// Source failures stay IO errors; a short read or anything the parquet
    /// decoder rejects means the bytes do not form a container.
    fn from(err: ParquetError) -> Self {
        match source_io_error(err) {
            Ok(e) if e.kind() != io::ErrorKind::UnexpectedEof => OpenError::Io(e),
            Ok(e) => OpenError::Malformed(e.to_string()),
            Err(e) => OpenError::Malformed(e.to_string()),
        }
    }
}

// =============================================================================
// Read Errors
// =============================================================================

/// Failures while scanning rows of an opened container
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt page: {0}")]
    Corrupt(String),
}

impl From<ParquetError> for ReadError {
    fn from(err: ParquetError) -> Self {
        match source_io_error(err) {
            Ok(e) => ReadError::Io(e),
            Err(e) => ReadError::Corrupt(e.to_string()),
        }
    }
}

/// Recover the IO error a byte source handed to the parquet decoder
fn source_io_error(err: ParquetError) -> std::result::Result<io::Error, ParquetError> {
    match err {
        ParquetError::External(inner) => match inner.downcast::<io::Error>() {
            Ok(e) => Ok(*e),
            Err(other) => Err(ParquetError::External(other)),
        },
        other => Err(other),
    }
}

// =============================================================================
// Export Errors
// =============================================================================

/// Failures while writing a container
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("parquet writer failed: {0}")]
    Parquet(#[from] ParquetError),

    #[error("source failed after {rows_written} rows: {source}")]
    SourceFailed {
        rows_written: u64,
        #[source]
        source: SourceError,
    },

    #[error("keys out of order at row {row}: {key:?} sorts before {previous:?}")]
    OutOfOrder {
        row: u64,
        previous: Vec<u8>,
        key: Vec<u8>,
    },

    #[error("failed to finalize container: {0}")]
    Finalize(io::Error),

    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),
}

// =============================================================================
// Unified Error
// =============================================================================

/// Unified error type for the store surface
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

impl Error {
    /// True for the read-only store's rejection of a mutation
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported(_))
    }
}
