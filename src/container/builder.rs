//! Container Builder
//!
//! Collects sorted key-value rows and writes them as a single parquet row
//! group with page-level statistics.

use std::io::{self, Write};
use std::sync::Arc;

use parquet::data_type::{ByteArray, ByteArrayType};
use parquet::errors::ParquetError;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use tracing::{debug, trace};

use crate::config::WriterConfig;
use crate::error::ExportError;

use super::{KEY_COLUMN, MAX_WRITE_BATCH, VALUE_COLUMN};

/// What a finished container holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    /// Number of rows written
    pub rows: u64,
    /// Total bytes written to the sink
    pub bytes_written: u64,
    /// Smallest key (empty if no rows)
    pub min_key: Vec<u8>,
    /// Largest key (empty if no rows)
    pub max_key: Vec<u8>,
}

/// Builder for creating new containers from sorted rows
///
/// Parquet writes a row group one column chunk at a time, so accepted rows
/// are held in memory until [`finish`](ContainerBuilder::finish). Nothing
/// reaches the sink before then.
pub struct ContainerBuilder<W: Write + Send> {
    sink: W,
    config: WriterConfig,
    keys: Vec<ByteArray>,
    values: Vec<ByteArray>,
    key_bytes: usize,
    value_bytes: usize,
}

impl<W: Write + Send> ContainerBuilder<W> {
    /// Create a new builder
    ///
    /// Call `add()` in sorted order, then `finish()` to write the container.
    pub fn new(sink: W, config: WriterConfig) -> Self {
        Self {
            sink,
            config,
            keys: Vec::new(),
            values: Vec::new(),
            key_bytes: 0,
            value_bytes: 0,
        }
    }

    /// Add a row. Keys must arrive in non-decreasing order.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<(), ExportError> {
        if let Some(previous) = self.keys.last() {
            if key < previous.data() {
                return Err(ExportError::OutOfOrder {
                    row: self.row_count(),
                    previous: previous.data().to_vec(),
                    key: key.to_vec(),
                });
            }
        }

        self.key_bytes += key.len();
        self.value_bytes += value.len();
        self.keys.push(ByteArray::from(key.to_vec()));
        self.values.push(ByteArray::from(value.to_vec()));
        Ok(())
    }

    /// Number of rows accepted so far
    pub fn row_count(&self) -> u64 {
        self.keys.len() as u64
    }

    /// Rows handed to the column writer per batch
    ///
    /// Page limits are checked between batches, so a batch never holds more
    /// rows than a page may, nor more bytes than a page should.
    fn write_batch_size(&self) -> usize {
        let rows = self.keys.len().max(1);
        // Plain encoding adds a 4-byte length to every cell
        let widest_row = (self.key_bytes.max(self.value_bytes) / rows) + 4;
        (self.config.page_size_bytes / widest_row)
            .clamp(1, self.config.max_rows_per_page.min(MAX_WRITE_BATCH))
    }

    fn writer_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_created_by(self.config.created_by.clone())
            .set_statistics_enabled(EnabledStatistics::Page)
            .set_column_index_truncate_length(None)
            .set_dictionary_enabled(false)
            .set_data_page_size_limit(self.config.page_size_bytes)
            .set_data_page_row_count_limit(self.config.max_rows_per_page)
            .set_write_batch_size(self.write_batch_size())
            .build()
    }

    /// Finish building: write the row group, the page index and the footer,
    /// then flush the sink.
    ///
    /// Zero rows give a container with zero row groups. A failure while
    /// writing the footer or flushing is reported as
    /// [`ExportError::Finalize`].
    pub fn finish(self) -> Result<ContainerSummary, ExportError> {
        let schema = Arc::new(parse_message_type(&format!(
            "message pagekv {{ required binary {}; required binary {}; }}",
            KEY_COLUMN, VALUE_COLUMN
        ))?);
        let props = Arc::new(self.writer_properties());
        let mut writer = SerializedFileWriter::new(CountingSink::new(self.sink), schema, props)?;

        if !self.keys.is_empty() {
            let mut row_group = writer.next_row_group()?;
            for (name, cells) in [(KEY_COLUMN, &self.keys), (VALUE_COLUMN, &self.values)] {
                let Some(mut column) = row_group.next_column()? else {
                    return Err(ParquetError::General(format!("no column writer for {}", name)).into());
                };
                column.typed::<ByteArrayType>().write_batch(cells, None, None)?;
                column.close()?;
                trace!(column = name, rows = cells.len(), "Wrote column chunk");
            }
            row_group.close()?;
        }

        let mut sink = writer
            .into_inner()
            .map_err(|e| ExportError::Finalize(io::Error::new(io::ErrorKind::Other, e)))?;
        sink.flush().map_err(ExportError::Finalize)?;

        let summary = ContainerSummary {
            rows: self.keys.len() as u64,
            bytes_written: sink.written,
            min_key: self.keys.first().map(|k| k.data().to_vec()).unwrap_or_default(),
            max_key: self.keys.last().map(|k| k.data().to_vec()).unwrap_or_default(),
        };

        debug!(
            rows = summary.rows,
            bytes = summary.bytes_written,
            "Finished container"
        );

        Ok(summary)
    }
}

/// Counts the bytes that pass through to the sink
struct CountingSink<W> {
    inner: W,
    written: u64,
}

impl<W> CountingSink<W> {
    fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }
}

impl<W: Write> Write for CountingSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
