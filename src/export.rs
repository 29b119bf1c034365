//! Exporter
//!
//! Writes an already-sorted key/value source into a new container.
//!
//! ## Steps
//! 1. Accept each record in source order, checking key order
//! 2. Write the key and value column chunks, cutting pages as they fill
//! 3. Write the page index and footer, then flush
//!
//! A source error aborts the export before anything reaches the sink.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::config::WriterConfig;
use crate::container::{ContainerBuilder, ContainerSummary};
use crate::error::{ExportError, SourceError};
use crate::store::{IndexMeta, STORE_FILENAME};

/// What an export wrote
pub type ExportSummary = ContainerSummary;

/// Export `source` into `sink`
///
/// The source must yield keys in non-decreasing order; an out-of-order key
/// fails with [`ExportError::OutOfOrder`]. The sink's previous contents are
/// never inspected.
pub fn export<I, K, V, E, W>(
    source: I,
    sink: W,
    config: &WriterConfig,
) -> Result<ExportSummary, ExportError>
where
    I: IntoIterator<Item = Result<(K, V), E>>,
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
    E: Into<SourceError>,
    W: Write + Send,
{
    let mut builder = ContainerBuilder::new(sink, config.clone());

    for item in source {
        let (key, value) = item.map_err(|e| ExportError::SourceFailed {
            rows_written: builder.row_count(),
            source: e.into(),
        })?;
        builder.add(key.as_ref(), value.as_ref())?;
    }

    builder.finish()
}

/// Export `source` into a new directory `dir`
///
/// Writes the container as `dir/store`, syncs it to disk, then writes the
/// `index_meta.json` sidecar. `dir` must not exist yet.
pub fn export_to_dir<I, K, V, E>(
    source: I,
    dir: &Path,
    config: &WriterConfig,
) -> Result<ExportSummary, ExportError>
where
    I: IntoIterator<Item = Result<(K, V), E>>,
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
    E: Into<SourceError>,
{
    if dir.exists() {
        return Err(ExportError::DestinationExists(dir.to_path_buf()));
    }
    fs::create_dir_all(dir)?;

    let path = dir.join(STORE_FILENAME);
    debug!(path = %path.display(), "Exporting container");

    let mut writer = BufWriter::new(File::create(&path)?);
    let summary = export(source, &mut writer, config)?;

    let file = writer
        .into_inner()
        .map_err(|e| ExportError::Finalize(e.into_error()))?;
    file.sync_all().map_err(ExportError::Finalize)?;

    IndexMeta::new(config.index_type.clone()).write(dir)?;

    info!(
        dir = %dir.display(),
        rows = summary.rows,
        bytes = summary.bytes_written,
        "Export complete"
    );

    Ok(summary)
}
