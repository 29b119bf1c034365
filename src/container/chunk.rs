//! Byte sources as parquet chunk readers
//!
//! Lets the parquet decoder pull footer, index and page bytes straight from
//! a [`ReadAt`] source with positional reads.

use std::io::{self, Read};
use std::sync::Arc;

use bytes::Bytes;
use parquet::errors::{ParquetError, Result};
use parquet::file::reader::{ChunkReader, Length};

use crate::source::ReadAt;

/// A [`ReadAt`] source of known length
pub(crate) struct SourceChunks {
    source: Arc<dyn ReadAt>,
    len: u64,
}

impl SourceChunks {
    pub(crate) fn new(source: Arc<dyn ReadAt>, len: u64) -> Self {
        Self { source, len }
    }
}

impl Length for SourceChunks {
    fn len(&self) -> u64 {
        self.len
    }
}

impl ChunkReader for SourceChunks {
    type T = SourceRead;

    fn get_read(&self, start: u64) -> Result<SourceRead> {
        if start > self.len {
            return Err(ParquetError::EOF(format!(
                "read at {} beyond source of {} bytes",
                start, self.len
            )));
        }
        Ok(SourceRead {
            source: Arc::clone(&self.source),
            position: start,
            end: self.len,
        })
    }

    fn get_bytes(&self, start: u64, length: usize) -> Result<Bytes> {
        let mut buf = vec![0u8; length];
        self.source.read_exact_at(&mut buf, start)?;
        Ok(Bytes::from(buf))
    }
}

/// Sequential reads from `position` to the end of the source
pub(crate) struct SourceRead {
    source: Arc<dyn ReadAt>,
    position: u64,
    end: u64,
}

impl Read for SourceRead {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.end.saturating_sub(self.position);
        let n = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        if n == 0 {
            return Ok(0);
        }
        self.source.read_exact_at(&mut buf[..n], self.position)?;
        self.position += n as u64;
        Ok(n)
    }
}
