//! Page and Offset Indexes
//!
//! In-memory views over the key column chunk's column index and offset
//! index, used to route a lookup to the first page that can hold its
//! target.

use std::cmp::Ordering;

use parquet::file::page_index::index::Index;
use parquet::format::PageLocation;

use crate::error::OpenError;

/// Compare `a` against `b`, treating "`a` is a byte-prefix of `b`" as equal.
///
/// Otherwise this is the raw lexicographic ordering. Page search calls it as
/// `prefix_compare(target, page_bound)`, so a page whose bound extends the
/// target (e.g. target `"p"`, bound `"pa"`) counts as touching the target.
pub fn prefix_compare(a: &[u8], b: &[u8]) -> Ordering {
    match a.cmp(b) {
        Ordering::Less if b.starts_with(a) => Ordering::Equal,
        other => other,
    }
}

/// Min/max key summaries for each page of the key column
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    min_values: Vec<Vec<u8>>,
    max_values: Vec<Vec<u8>>,
}

impl PageIndex {
    /// Decode the key chunk's column index
    ///
    /// Every page must carry both bounds, and page ranges must ascend.
    pub(crate) fn from_column_index(index: &Index) -> Result<Self, OpenError> {
        let native = match index {
            Index::BYTE_ARRAY(native) => native,
            Index::NONE => {
                return Err(OpenError::Malformed(
                    "key column has no column index".to_string(),
                ))
            }
            _ => {
                return Err(OpenError::Malformed(
                    "key column index does not hold byte arrays".to_string(),
                ))
            }
        };

        let mut min_values = Vec::with_capacity(native.indexes.len());
        let mut max_values: Vec<Vec<u8>> = Vec::with_capacity(native.indexes.len());
        for (page, entry) in native.indexes.iter().enumerate() {
            let (Some(min), Some(max)) = (entry.min.as_ref(), entry.max.as_ref()) else {
                return Err(OpenError::Malformed(format!(
                    "key page {} has no min/max statistics",
                    page
                )));
            };
            let (min, max) = (min.data(), max.data());
            if min > max {
                return Err(OpenError::Malformed(format!("key page {} has min > max", page)));
            }
            if max_values.last().is_some_and(|previous| previous.as_slice() > min) {
                return Err(OpenError::Malformed(format!(
                    "key page {} overlaps the page before it",
                    page
                )));
            }
            min_values.push(min.to_vec());
            max_values.push(max.to_vec());
        }

        Ok(Self {
            min_values,
            max_values,
        })
    }

    /// Number of pages summarized
    pub fn num_pages(&self) -> usize {
        self.max_values.len()
    }

    /// Smallest key stored in `page`
    pub fn min_value(&self, page: usize) -> Option<&[u8]> {
        self.min_values.get(page).map(Vec::as_slice)
    }

    /// Largest key stored in `page`
    pub fn max_value(&self, page: usize) -> Option<&[u8]> {
        self.max_values.get(page).map(Vec::as_slice)
    }

    /// Binary-search for the first page that could contain `target`, or
    /// failing that the first key after it.
    ///
    /// A page is skipped only when `cmp(target, max)` says the target sorts
    /// strictly after everything in it. Returns `num_pages()` when every
    /// page is skipped, meaning no row is `>= target`.
    pub fn find<F>(&self, target: &[u8], cmp: F) -> usize
    where
        F: Fn(&[u8], &[u8]) -> Ordering,
    {
        // Page maxima ascend, so "target after max" is true for a prefix of pages.
        self.max_values
            .partition_point(|max| cmp(target, max) == Ordering::Greater)
    }

    /// Whether `key` lies within the min/max bounds of `page`
    pub fn covers(&self, page: usize, key: &[u8]) -> bool {
        match (self.min_value(page), self.max_value(page)) {
            (Some(min), Some(max)) => min <= key && key <= max,
            _ => false,
        }
    }
}

/// First-row positions for each page of a column
#[derive(Debug, Clone, Default)]
pub struct OffsetIndex {
    first_rows: Vec<u64>,
    num_rows: u64,
}

impl OffsetIndex {
    /// Decode a chunk's page locations
    ///
    /// The first page starts at row 0 and first rows strictly ascend below
    /// `num_rows`.
    pub(crate) fn from_locations(
        locations: &[PageLocation],
        num_rows: u64,
    ) -> Result<Self, OpenError> {
        let mut first_rows: Vec<u64> = Vec::with_capacity(locations.len());
        for (page, location) in locations.iter().enumerate() {
            let first = u64::try_from(location.first_row_index).map_err(|_| {
                OpenError::Malformed(format!("page {} has a negative first row", page))
            })?;
            let expected_order = match first_rows.last() {
                None => first == 0,
                Some(&previous) => first > previous,
            };
            if !expected_order || first >= num_rows {
                return Err(OpenError::Malformed(format!(
                    "page {} starts at row {} out of order",
                    page, first
                )));
            }
            first_rows.push(first);
        }

        Ok(Self {
            first_rows,
            num_rows,
        })
    }

    /// Number of pages in the column
    pub fn num_pages(&self) -> usize {
        self.first_rows.len()
    }

    /// Row index of the first row in `page`
    pub fn first_row_index(&self, page: usize) -> Option<u64> {
        self.first_rows.get(page).copied()
    }

    /// Total rows covered by the column
    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    /// The page holding `row`, or `None` past the last row
    pub fn page_for_row(&self, row: u64) -> Option<usize> {
        if row >= self.num_rows {
            return None;
        }
        // Last page whose first row is <= row
        let after = self.first_rows.partition_point(|&first| first <= row);
        after.checked_sub(1)
    }
}
