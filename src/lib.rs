//! # PageKV
//!
//! A read-optimized, immutable, sorted key-value store with:
//! - A parquet container with a key column and a value column
//! - Per-page min/max key summaries for page-level binary search
//! - Point lookups with prefix-aware page routing
//! - Forward cursors bounded by a prefix or a half-open range
//! - An exporter from any sorted key/value source
//!
//! ## Architecture Overview
//!
//! ```text
//!   sorted (key, value) source
//!               │
//!               ▼
//!   ┌───────────────────────┐
//!   │       Exporter        │  export / export_to_dir
//!   └───────────┬───────────┘
//!               │ parquet row group + page index
//!               ▼
//!   ┌───────────────────────┐
//!   │      Container        │  page index, offset index, row readers
//!   └───────────┬───────────┘
//!               │
//!      ┌────────┴────────┐
//!      ▼                 ▼
//!   ┌────────┐      ┌─────────┐
//!   │ Reader │      │ Cursor  │  get / multi_get, seek / next
//!   └────────┘      └─────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod source;

pub mod container;
pub mod export;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{StoreConfig, WriterConfig};
pub use container::{Container, KeyValue};
pub use error::{Error, Result};
pub use export::{export, export_to_dir, ExportSummary};
pub use source::ReadAt;
pub use store::{Cursor, Reader, Store, Writer};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of PageKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
