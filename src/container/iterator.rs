//! Container Row Reader
//!
//! Sequential, forward-only iteration over rows starting at any row index.
//! The key and value column chunks are decoded in step, a small batch of
//! records at a time; pages are fetched lazily as the batches cross them.

use bytes::Bytes;
use parquet::column::reader::ColumnReaderImpl;
use parquet::data_type::{ByteArray, ByteArrayType};
use tracing::trace;

use crate::error::ReadError;

use super::{KeyValue, RowReader, ROW_BATCH};

/// Typed reader over one byte-array column chunk
pub(crate) type ByteArrayColumn = ColumnReaderImpl<ByteArrayType>;

/// Forward reader over the rows of the visible row group
pub struct ColumnRowReader {
    keys: ByteArrayColumn,
    values: ByteArrayColumn,
    /// Decoded records of the current batch
    key_batch: Vec<ByteArray>,
    value_batch: Vec<ByteArray>,
    /// Position of the next row within the current batch
    position: usize,
}

impl ColumnRowReader {
    /// Position a new reader so the first `next_row` returns row `row`
    ///
    /// Whole pages before `row` are skipped through the offset index
    /// without being decoded.
    pub(super) fn new(
        mut keys: ByteArrayColumn,
        mut values: ByteArrayColumn,
        row: u64,
    ) -> Result<Self, ReadError> {
        let skip = usize::try_from(row)
            .map_err(|_| ReadError::Corrupt(format!("row {} out of addressable range", row)))?;
        if skip > 0 {
            trace!(row, "Skipping to row");
            skip_rows(&mut keys, skip)?;
            skip_rows(&mut values, skip)?;
        }

        Ok(Self {
            keys,
            values,
            key_batch: Vec::with_capacity(ROW_BATCH),
            value_batch: Vec::with_capacity(ROW_BATCH),
            position: 0,
        })
    }

    /// Decode the next batch from both columns
    fn refill(&mut self) -> Result<(), ReadError> {
        self.key_batch.clear();
        self.value_batch.clear();
        self.position = 0;

        let (key_rows, _, _) = self
            .keys
            .read_records(ROW_BATCH, None, None, &mut self.key_batch)?;
        let (value_rows, _, _) = self
            .values
            .read_records(ROW_BATCH, None, None, &mut self.value_batch)?;

        if key_rows != value_rows {
            return Err(ReadError::Corrupt(format!(
                "key column yielded {} rows where value column yielded {}",
                key_rows, value_rows
            )));
        }
        self.key_batch.truncate(key_rows);
        self.value_batch.truncate(value_rows);
        if self.key_batch.len() != key_rows || self.value_batch.len() != value_rows {
            return Err(ReadError::Corrupt("short record batch".to_string()));
        }

        Ok(())
    }
}

fn skip_rows(column: &mut ByteArrayColumn, rows: usize) -> Result<(), ReadError> {
    let skipped = column.skip_records(rows)?;
    if skipped != rows {
        return Err(ReadError::Corrupt(format!(
            "column ended after {} of {} skipped rows",
            skipped, rows
        )));
    }
    Ok(())
}

impl RowReader for ColumnRowReader {
    fn next_row(&mut self) -> Result<Option<KeyValue>, ReadError> {
        if self.position >= self.key_batch.len() {
            self.refill()?;
            if self.key_batch.is_empty() {
                return Ok(None);
            }
        }

        let row = KeyValue {
            key: Bytes::copy_from_slice(self.key_batch[self.position].data()),
            value: Bytes::copy_from_slice(self.value_batch[self.position].data()),
        };
        self.position += 1;
        Ok(Some(row))
    }
}
