//! Cursor
//!
//! Stateful forward cursor over a container, optionally bounded by a key
//! prefix or a half-open key range.
//!
//! ## States
//! ```text
//!   Unpositioned ──seek──▶ Positioned ──next──▶ Positioned
//!                              │                    │
//!                              │ next (out of bound)│
//!                              ▼                    ▼
//!                          OutOfBound ──next──▶ Exhausted (terminal)
//! ```
//! End-of-data, an empty page search and read failures all land in
//! `Exhausted`; a failure keeps its error for [`Cursor::error`].

use bytes::Bytes;
use tracing::trace;

use crate::container::{prefix_compare, PagedColumns, RowReader};
use crate::error::{ReadError, Result};

use super::api::KvIterator;

/// The restriction on which rows a cursor reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorBound {
    /// Every row
    None,
    /// Rows whose key starts with the prefix
    Prefix(Vec<u8>),
    /// Rows with `start <= key < end`; no `end` means no upper bound
    Range { start: Vec<u8>, end: Option<Vec<u8>> },
}

impl CursorBound {
    /// Whether `key` satisfies the upper side of the bound
    fn admits(&self, key: &[u8]) -> bool {
        match self {
            CursorBound::None => true,
            CursorBound::Prefix(prefix) => key.starts_with(prefix),
            CursorBound::Range { end, .. } => end.as_deref().map_or(true, |end| key < end),
        }
    }

    /// Move a seek target into the bound.
    ///
    /// `None` means the target lies past every row the bound admits.
    fn clamp(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self {
            CursorBound::Range { start, .. } if key < start.as_slice() => Some(start.clone()),
            CursorBound::Prefix(prefix) if !key.starts_with(prefix) => {
                if key < prefix.as_slice() {
                    Some(prefix.clone())
                } else {
                    prefix_upper_bound(prefix)
                }
            }
            _ => Some(key.to_vec()),
        }
    }
}

/// The shortest key greater than every key starting with `prefix`.
///
/// Increments the last byte below `0xFF` and truncates after it. A prefix
/// made only of `0xFF` bytes (or an empty one) has no finite upper bound.
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let last = prefix.iter().rposition(|&b| b < 0xFF)?;
    let mut end = prefix[..=last].to_vec();
    end[last] += 1;
    Some(end)
}

enum CursorState {
    Unpositioned,
    Positioned { key: Bytes, value: Bytes },
    /// A row was read but falls outside the bound
    OutOfBound,
    Exhausted(Option<ReadError>),
}

/// Forward cursor with prefix or range bounding
///
/// Holds at most one open row reader; each `seek` replaces it. Not meant
/// for concurrent use; open one cursor per caller.
pub struct Cursor<'a> {
    /// `None` for a store without rows
    columns: Option<&'a dyn PagedColumns>,
    bound: CursorBound,
    rows: Option<Box<dyn RowReader + 'a>>,
    state: CursorState,
}

impl<'a> Cursor<'a> {
    /// Create an unpositioned cursor; call [`seek`](Cursor::seek) first
    pub fn new(columns: Option<&'a dyn PagedColumns>, bound: CursorBound) -> Self {
        Self {
            columns,
            bound,
            rows: None,
            state: CursorState::Unpositioned,
        }
    }

    /// The active bound
    pub fn bound(&self) -> &CursorBound {
        &self.bound
    }

    /// Position at the first row whose key is `>= key`, after clamping
    /// `key` into the bound. Discards any previous position.
    ///
    /// Has no effect once the cursor is exhausted.
    pub fn seek(&mut self, key: &[u8]) {
        if self.is_exhausted() {
            return;
        }
        // Release the previous reader before opening a new one
        self.rows = None;

        let Some(target) = self.bound.clamp(key) else {
            trace!("Seek target past the bound");
            return self.finish(None);
        };
        let Some(columns) = self.columns else {
            return self.finish(None);
        };

        let page = columns.page_index().find(&target, prefix_compare);
        let Some(first_row) = columns.offset_index().first_row_index(page) else {
            trace!(seek_key = ?target, "Seek target past the last page");
            return self.finish(None);
        };

        let mut rows = match columns.open_rows(first_row) {
            Ok(rows) => rows,
            Err(e) => return self.finish(Some(e)),
        };

        loop {
            match rows.next_row() {
                Ok(Some(row)) if row.key.as_ref() < target.as_slice() => continue,
                Ok(Some(row)) => {
                    self.state = CursorState::Positioned {
                        key: row.key,
                        value: row.value,
                    };
                    self.rows = Some(rows);
                    return;
                }
                Ok(None) => return self.finish(None),
                Err(e) => return self.finish(Some(e)),
            }
        }
    }

    /// Read one more row. A row outside the bound leaves the cursor
    /// positioned but invalid.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        if self.is_exhausted() {
            return;
        }
        let Some(rows) = self.rows.as_mut() else {
            return;
        };

        match rows.next_row() {
            Ok(Some(row)) => {
                self.state = if self.bound.admits(&row.key) {
                    CursorState::Positioned {
                        key: row.key,
                        value: row.value,
                    }
                } else {
                    CursorState::OutOfBound
                };
            }
            Ok(None) => self.finish(None),
            Err(e) => self.finish(Some(e)),
        }
    }

    /// True when the cursor holds a row that satisfies its bound
    pub fn valid(&self) -> bool {
        match &self.state {
            CursorState::Positioned { key, .. } => self.bound.admits(key),
            _ => false,
        }
    }

    /// `(key, value)` of the current row, if valid
    pub fn current(&self) -> Option<(&[u8], &[u8])> {
        match &self.state {
            CursorState::Positioned { key, value } if self.valid() => {
                Some((key.as_ref(), value.as_ref()))
            }
            _ => None,
        }
    }

    /// Key of the current row, if valid
    pub fn key(&self) -> Option<&[u8]> {
        self.current().map(|(key, _)| key)
    }

    /// Value of the current row, if valid
    pub fn value(&self) -> Option<&[u8]> {
        self.current().map(|(_, value)| value)
    }

    /// The read failure that ended the cursor, if any
    pub fn error(&self) -> Option<&ReadError> {
        match &self.state {
            CursorState::Exhausted(error) => error.as_ref(),
            _ => None,
        }
    }

    /// Take the read failure that ended the cursor, leaving it exhausted
    pub fn take_error(&mut self) -> Option<ReadError> {
        match &mut self.state {
            CursorState::Exhausted(error) => error.take(),
            _ => None,
        }
    }

    /// True once the cursor reached its terminal state
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, CursorState::Exhausted(_))
    }

    /// Release the open row reader and end the cursor for good.
    ///
    /// Close is terminal: a later `seek` or `next` does nothing and the
    /// cursor stays invalid. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.rows = None;
        if !self.is_exhausted() {
            self.state = CursorState::Exhausted(None);
        }
    }

    fn finish(&mut self, error: Option<ReadError>) {
        if let Some(e) = &error {
            trace!(error = %e, "Cursor failed");
        }
        self.rows = None;
        self.state = CursorState::Exhausted(error);
    }
}

impl KvIterator for Cursor<'_> {
    fn seek(&mut self, key: &[u8]) {
        Cursor::seek(self, key)
    }

    fn next(&mut self) {
        Cursor::next(self)
    }

    fn valid(&self) -> bool {
        Cursor::valid(self)
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        Cursor::current(self)
    }

    fn key(&self) -> Option<&[u8]> {
        Cursor::key(self)
    }

    fn value(&self) -> Option<&[u8]> {
        Cursor::value(self)
    }

    fn close(&mut self) -> Result<()> {
        Cursor::close(self);
        Ok(())
    }
}
