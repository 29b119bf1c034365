//! Point Reader
//!
//! Stateless-per-call lookups. Every `get` opens its own row reader, so
//! several readers can share one container.

use std::cmp::Ordering;

use bytes::Bytes;
use tracing::trace;

use crate::container::{prefix_compare, Container, PagedColumns};
use crate::error::{ReadError, Result};

use super::api::{KvIterator, KvReader};
use super::cursor::{Cursor, CursorBound};

/// Read handle over a container
#[derive(Clone, Copy)]
pub struct Reader<'a> {
    /// `None` for a store without rows
    columns: Option<&'a dyn PagedColumns>,
}

impl<'a> Reader<'a> {
    /// Reader over any paged key/value columns
    pub fn new(columns: Option<&'a dyn PagedColumns>) -> Self {
        Self { columns }
    }

    /// Look up the value stored under exactly `key`
    ///
    /// Routes to the first page that can hold `key`, then scans forward
    /// until the key is found or a larger key proves it absent. A key that
    /// falls outside that page's min/max is answered without reading rows.
    pub fn get(&self, key: &[u8]) -> std::result::Result<Option<Bytes>, ReadError> {
        let Some(columns) = self.columns else {
            return Ok(None);
        };

        let page = columns.page_index().find(key, prefix_compare);
        let Some(first_row) = columns.offset_index().first_row_index(page) else {
            trace!(page, "Key sorts after every page");
            return Ok(None);
        };
        if !columns.page_index().covers(page, key) {
            trace!(page, "Key falls between pages");
            return Ok(None);
        }

        let mut rows = columns.open_rows(first_row)?;
        while let Some(row) = rows.next_row()? {
            match row.key.as_ref().cmp(key) {
                Ordering::Equal => return Ok(Some(row.value)),
                Ordering::Greater => return Ok(None),
                Ordering::Less => {}
            }
        }

        Ok(None)
    }

    /// Look up each key independently, preserving input order
    ///
    /// The first failed lookup aborts the whole batch.
    pub fn multi_get<K: AsRef<[u8]>>(
        &self,
        keys: &[K],
    ) -> std::result::Result<Vec<Option<Bytes>>, ReadError> {
        keys.iter().map(|key| self.get(key.as_ref())).collect()
    }

    /// Cursor over every key starting with `prefix`, seeded at `prefix`
    pub fn prefix_iterator(&self, prefix: &[u8]) -> Cursor<'a> {
        let mut cursor = Cursor::new(self.columns, CursorBound::Prefix(prefix.to_vec()));
        cursor.seek(prefix);
        cursor
    }

    /// Cursor over keys in `[start, end)`, seeded at `start`
    ///
    /// `None` means no upper bound; `Some(end)` with `end <= start` is an
    /// empty range.
    pub fn range_iterator(&self, start: &[u8], end: Option<&[u8]>) -> Cursor<'a> {
        let bound = CursorBound::Range {
            start: start.to_vec(),
            end: end.map(<[u8]>::to_vec),
        };
        let mut cursor = Cursor::new(self.columns, bound);
        cursor.seek(start);
        cursor
    }

    /// Cursor over every row, positioned at the first one
    pub fn iterator(&self) -> Cursor<'a> {
        let mut cursor = Cursor::new(self.columns, CursorBound::None);
        cursor.seek(&[]);
        cursor
    }

    /// Nothing to release; always succeeds
    pub fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<'a> From<&'a Container> for Reader<'a> {
    fn from(container: &'a Container) -> Self {
        Self::new(Some(container as &dyn PagedColumns))
    }
}

impl KvReader for Reader<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        Ok(Reader::get(self, key)?)
    }

    fn multi_get(&self, keys: &[&[u8]]) -> Result<Vec<Option<Bytes>>> {
        Ok(Reader::multi_get(self, keys)?)
    }

    fn prefix_iterator(&self, prefix: &[u8]) -> Box<dyn KvIterator + '_> {
        Box::new(Reader::prefix_iterator(self, prefix))
    }

    fn range_iterator(&self, start: &[u8], end: Option<&[u8]>) -> Box<dyn KvIterator + '_> {
        Box::new(Reader::range_iterator(self, start, end))
    }

    fn close(&mut self) -> Result<()> {
        Reader::close(self)
    }
}
