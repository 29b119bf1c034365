//! Store contract
//!
//! The read/write surface a host index engine expects from a KV store.
//! The concrete [`Reader`](super::Reader), [`Cursor`](super::Cursor) and
//! [`Writer`](super::Writer) implement these, so callers can work against
//! trait objects.

use bytes::Bytes;

use crate::error::Result;

use super::writer::{Batch, BatchOptions};

/// A read-only snapshot of the store
pub trait KvReader {
    /// Value stored under exactly `key`
    fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// One slot per key, in input order
    fn multi_get(&self, keys: &[&[u8]]) -> Result<Vec<Option<Bytes>>>;

    /// Cursor over every key starting with `prefix`
    fn prefix_iterator(&self, prefix: &[u8]) -> Box<dyn KvIterator + '_>;

    /// Cursor over keys in `[start, end)`; `None` leaves the range open above
    fn range_iterator(&self, start: &[u8], end: Option<&[u8]>) -> Box<dyn KvIterator + '_>;

    fn close(&mut self) -> Result<()>;
}

/// A forward-only cursor
pub trait KvIterator {
    /// Position at the first in-bound key `>= key`
    fn seek(&mut self, key: &[u8]);

    /// Advance one row
    fn next(&mut self);

    fn valid(&self) -> bool;

    /// `(key, value)` if the cursor is valid
    fn current(&self) -> Option<(&[u8], &[u8])>;

    fn key(&self) -> Option<&[u8]>;

    fn value(&self) -> Option<&[u8]>;

    fn close(&mut self) -> Result<()>;
}

/// Mutation surface; exists only to satisfy the contract
pub trait KvWriter {
    fn new_batch(&self) -> Batch;

    fn new_batch_ex(&self, options: BatchOptions) -> Result<(Vec<u8>, Batch)>;

    fn execute_batch(&mut self, batch: Batch) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}
