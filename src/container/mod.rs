//! Container Module
//!
//! Immutable, page-oriented columnar container for sorted key/value rows,
//! stored as a parquet file.
//!
//! Rows live in a single row group made of two required byte-array
//! columns, `key` and `value`. Each column chunk is split into data pages.
//! Page-level statistics are enabled, so the key chunk carries a column
//! index (per-page min/max, the page index) and an offset index (page →
//! first row). Pages of the two columns need not line up; rows are read
//! from both chunks in step.
//!
//! ## File Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ "PAR1"                                                  │
//! ├─────────────────────────────────────────────────────────┤
//! │ Row group 0                                             │
//! │   key chunk:   data page 0 | data page 1 | ...          │
//! │   value chunk: data page 0 | data page 1 | ...          │
//! ├─────────────────────────────────────────────────────────┤
//! │ Column indexes (min/max per page)                       │
//! │ Offset indexes (offset, size, first row per page)       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Footer: thrift FileMetaData | length: u32 | "PAR1"      │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod builder;
mod chunk;
mod iterator;
mod page_index;
mod reader;

use bytes::Bytes;

use crate::error::ReadError;

pub use builder::{ContainerBuilder, ContainerSummary};
pub use iterator::ColumnRowReader;
pub use page_index::{prefix_compare, OffsetIndex, PageIndex};
pub use reader::Container;

// =============================================================================
// Shared Constants (used by builder, reader, iterator)
// =============================================================================

/// Column names, in physical order
pub(crate) const KEY_COLUMN: &str = "key";
pub(crate) const VALUE_COLUMN: &str = "value";

/// Leaf positions of the two columns in the schema
pub(crate) const KEY_COLUMN_INDEX: usize = 0;
pub(crate) const VALUE_COLUMN_INDEX: usize = 1;

/// Rows decoded per column read while scanning
pub(crate) const ROW_BATCH: usize = 64;

/// Upper bound on the column writer's internal batch; page limits are
/// checked between batches
pub(crate) const MAX_WRITE_BATCH: usize = 1024;

// =============================================================================
// Rows and Capabilities
// =============================================================================

/// One row read back from a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Bytes,
    pub value: Bytes,
}

/// Forward-only reader over consecutive rows
pub trait RowReader {
    /// Read the next row, or `None` at end-of-data
    fn next_row(&mut self) -> Result<Option<KeyValue>, ReadError>;
}

/// The capabilities point lookups and cursors need from a container.
///
/// Keeps [`crate::store`] free of any knowledge about the on-disk layout.
pub trait PagedColumns: Send + Sync {
    /// Min/max summaries of the key column's pages
    fn page_index(&self) -> &PageIndex;

    /// Page → first row mapping of the key column
    fn offset_index(&self) -> &OffsetIndex;

    /// Open a fresh sequential reader positioned at `row`
    fn open_rows(&self, row: u64) -> Result<Box<dyn RowReader + '_>, ReadError>;
}
