//! Write Stub
//!
//! The store is immutable. Batches can be built so callers that always
//! construct one keep working, but executing a batch is rejected.

use tracing::debug;

use crate::error::{Error, Result};

use super::api::KvWriter;

/// A buffered mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Set { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
    Merge { key: Vec<u8>, value: Vec<u8> },
}

/// Size hints for [`Writer::new_batch_ex`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub total_bytes: usize,
    pub num_sets: usize,
    pub num_deletes: usize,
    pub num_merges: usize,
}

/// Placeholder batch; records operations but can never be applied
#[derive(Debug, Clone, Default)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(BatchOp::Set {
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.ops.push(BatchOp::Delete { key: key.to_vec() });
    }

    pub fn merge(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(BatchOp::Merge {
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn reset(&mut self) {
        self.ops.clear();
    }
}

/// Write handle that rejects every mutation
#[derive(Debug, Default)]
pub struct Writer {
    _private: (),
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an empty placeholder batch
    pub fn new_batch(&self) -> Batch {
        Batch::new()
    }

    /// Build a placeholder batch; the returned buffer is always empty
    pub fn new_batch_ex(&self, options: BatchOptions) -> Result<(Vec<u8>, Batch)> {
        let ops = options.num_sets + options.num_deletes + options.num_merges;
        Ok((
            Vec::new(),
            Batch {
                ops: Vec::with_capacity(ops),
            },
        ))
    }

    /// Always fails with [`Error::Unsupported`]
    pub fn execute_batch(&mut self, batch: Batch) -> Result<()> {
        debug!(ops = batch.len(), "Rejected batch on read-only store");
        Err(Error::Unsupported("execute_batch"))
    }

    /// Nothing to release; always succeeds
    pub fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl KvWriter for Writer {
    fn new_batch(&self) -> Batch {
        Writer::new_batch(self)
    }

    fn new_batch_ex(&self, options: BatchOptions) -> Result<(Vec<u8>, Batch)> {
        Writer::new_batch_ex(self, options)
    }

    fn execute_batch(&mut self, batch: Batch) -> Result<()> {
        Writer::execute_batch(self, batch)
    }

    fn close(&mut self) -> Result<()> {
        Writer::close(self)
    }
}
