//! Container Reader
//!
//! Opens a parquet container from a random-access source with its page
//! index loaded, validates the key/value layout and exposes the single
//! sorted row group.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use parquet::basic::Type as PhysicalType;
use parquet::column::reader::ColumnReader;
use parquet::file::metadata::ParquetMetaData;
use parquet::file::reader::{FileReader, RowGroupReader};
use parquet::file::serialized_reader::{ReadOptionsBuilder, SerializedFileReader};
use parquet::schema::types::SchemaDescriptor;
use tracing::{debug, warn};

use crate::error::{OpenError, ReadError};
use crate::source::ReadAt;

use super::chunk::SourceChunks;
use super::iterator::{ByteArrayColumn, ColumnRowReader};
use super::page_index::{OffsetIndex, PageIndex};
use super::{PagedColumns, RowReader, KEY_COLUMN, KEY_COLUMN_INDEX, VALUE_COLUMN, VALUE_COLUMN_INDEX};

/// Handle on an opened container
///
/// Owns the parquet reader and the decoded key indexes. Shareable across
/// threads; every row reader opened from it keeps its own position.
pub struct Container {
    file: SerializedFileReader<SourceChunks>,
    len: u64,
    num_rows: u64,
    page_index: PageIndex,
    offset_index: OffsetIndex,
}

impl Container {
    /// Open a container from `source`, which holds `len` bytes
    ///
    /// Fails with [`OpenError::Malformed`] on structural corruption and
    /// [`OpenError::Empty`] when the container holds no row group. Only the
    /// first row group is visible if several are present.
    pub fn open(source: Arc<dyn ReadAt>, len: u64) -> Result<Self, OpenError> {
        let options = ReadOptionsBuilder::new().with_page_index().build();
        let file = SerializedFileReader::new_with_options(SourceChunks::new(source, len), options)?;

        let metadata = file.metadata();
        check_schema(metadata.file_metadata().schema_descr())?;

        let Some(row_group) = metadata.row_groups().first() else {
            return Err(OpenError::Empty);
        };
        if metadata.num_row_groups() > 1 {
            warn!(
                row_groups = metadata.num_row_groups(),
                "Container has several row groups; only the first is visible"
            );
        }

        let num_rows = u64::try_from(row_group.num_rows())
            .ok()
            .filter(|&rows| rows > 0)
            .ok_or_else(|| OpenError::Malformed("row group holds no rows".to_string()))?;
        let (page_index, offset_index) = key_indexes(metadata, num_rows)?;

        debug!(
            bytes = len,
            rows = num_rows,
            pages = page_index.num_pages(),
            "Opened container"
        );

        Ok(Self {
            file,
            len,
            num_rows,
            page_index,
            offset_index,
        })
    }

    /// Open a container file on disk
    pub fn open_path(path: &Path) -> Result<Self, OpenError> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Self::open(Arc::new(file), len)
    }

    /// Decoded parquet metadata, including the page index
    pub fn metadata(&self) -> &ParquetMetaData {
        self.file.metadata()
    }

    /// Writer identification recorded in the footer
    pub fn created_by(&self) -> Option<&str> {
        self.metadata().file_metadata().created_by()
    }

    /// Page index of the key column
    pub fn page_index(&self) -> &PageIndex {
        &self.page_index
    }

    /// Offset index of the key column
    pub fn offset_index(&self) -> &OffsetIndex {
        &self.offset_index
    }

    /// Rows visible to readers
    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    /// Size of the container in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True when no rows are visible; open rejects such containers
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Open a fresh sequential reader positioned at `row`
    ///
    /// A row at or past the end gives a reader that is exhausted at once.
    pub fn rows_from(&self, row: u64) -> Result<ColumnRowReader, ReadError> {
        let row_group = self.file.get_row_group(0)?;
        let keys = byte_array_column(row_group.as_ref(), KEY_COLUMN_INDEX)?;
        let values = byte_array_column(row_group.as_ref(), VALUE_COLUMN_INDEX)?;
        ColumnRowReader::new(keys, values, row.min(self.num_rows))
    }
}

impl PagedColumns for Container {
    fn page_index(&self) -> &PageIndex {
        &self.page_index
    }

    fn offset_index(&self) -> &OffsetIndex {
        &self.offset_index
    }

    fn open_rows(&self, row: u64) -> Result<Box<dyn RowReader + '_>, ReadError> {
        Ok(Box::new(self.rows_from(row)?))
    }
}

/// The schema must be exactly two required byte-array leaves, key then value
fn check_schema(schema: &SchemaDescriptor) -> Result<(), OpenError> {
    if schema.num_columns() != 2 {
        return Err(OpenError::Malformed(format!(
            "expected 2 columns, found {}",
            schema.num_columns()
        )));
    }
    for (index, name) in [(KEY_COLUMN_INDEX, KEY_COLUMN), (VALUE_COLUMN_INDEX, VALUE_COLUMN)] {
        let column = schema.column(index);
        if column.name() != name
            || column.physical_type() != PhysicalType::BYTE_ARRAY
            || column.max_def_level() != 0
            || column.max_rep_level() != 0
        {
            return Err(OpenError::Malformed(format!(
                "column {} must be a required byte array named {:?}",
                index, name
            )));
        }
    }
    Ok(())
}

/// Decode the column index and offset index of the first row group's key chunk
fn key_indexes(
    metadata: &ParquetMetaData,
    num_rows: u64,
) -> Result<(PageIndex, OffsetIndex), OpenError> {
    let column_index = metadata
        .column_index()
        .and_then(|row_groups| row_groups.first())
        .and_then(|columns| columns.get(KEY_COLUMN_INDEX))
        .ok_or_else(|| OpenError::Malformed("container has no column index".to_string()))?;
    let offset_index = metadata
        .offset_index()
        .and_then(|row_groups| row_groups.first())
        .and_then(|columns| columns.get(KEY_COLUMN_INDEX))
        .ok_or_else(|| OpenError::Malformed("container has no offset index".to_string()))?;

    let page_index = PageIndex::from_column_index(column_index)?;
    let offset_index = OffsetIndex::from_locations(offset_index.page_locations(), num_rows)?;

    if page_index.num_pages() == 0 || page_index.num_pages() != offset_index.num_pages() {
        return Err(OpenError::Malformed(format!(
            "column index covers {} pages, offset index {}",
            page_index.num_pages(),
            offset_index.num_pages()
        )));
    }

    Ok((page_index, offset_index))
}

fn byte_array_column(
    row_group: &dyn RowGroupReader,
    index: usize,
) -> Result<ByteArrayColumn, ReadError> {
    match row_group.get_column_reader(index)? {
        ColumnReader::ByteArrayColumnReader(reader) => Ok(reader),
        _ => Err(ReadError::Corrupt(format!(
            "column {} is not a byte array column",
            index
        ))),
    }
}
