//! Store Module
//!
//! The queryable KV-store surface over one container.
//!
//! ## Responsibilities
//! - Resolve construction options into an open container
//! - Point lookups (`get`, `multi_get`) through [`Reader`]
//! - Prefix and range scans through [`Cursor`]
//! - Reject mutation through [`Writer`]
//!
//! Stores are built explicitly with [`Store::open`] or [`Store::open_dir`];
//! there is no global registry of store kinds.

mod api;
mod cursor;
mod meta;
mod reader;
mod writer;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{StoreConfig, StoreSource};
use crate::container::{Container, PagedColumns};
use crate::error::{OpenError, Result};

pub use api::{KvIterator, KvReader, KvWriter};
pub use cursor::{prefix_upper_bound, Cursor, CursorBound};
pub use meta::{IndexMeta, META_FILENAME, STORE_FILENAME, STORE_NAME};
pub use reader::Reader;
pub use writer::{Batch, BatchOp, BatchOptions, Writer};

/// A read-only key/value store backed by one container
pub struct Store {
    /// `None` when the container holds no rows
    container: Option<Container>,
}

impl Store {
    /// Open a store from its construction options
    ///
    /// A container without any row group opens as an empty store whose
    /// lookups all return "not found".
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let opened = match config.source()? {
            StoreSource::Path(path) => {
                debug!(path = %path.display(), "Opening store from path");
                Container::open_path(&path)
            }
            StoreSource::Reader(reader) => {
                debug!(len = reader.len, "Opening store from reader");
                Container::open(Arc::clone(&reader.source), reader.len)
            }
        };

        match opened {
            Ok(container) => Ok(Self::from_container(container)),
            Err(OpenError::Empty) => {
                info!("Container holds no rows; opening empty store");
                Ok(Self { container: None })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open an export directory: check its sidecar, then open its container
    pub fn open_dir(dir: &Path) -> Result<Self> {
        let meta = IndexMeta::read(dir)?;
        meta.check_storage()?;
        Self::open(&StoreConfig::for_path(dir.join(STORE_FILENAME)))
    }

    /// Wrap an already-open container
    pub fn from_container(container: Container) -> Self {
        Self {
            container: Some(container),
        }
    }

    /// The open container, if the store holds rows
    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    /// True when the store holds no rows
    pub fn is_empty(&self) -> bool {
        self.container.is_none()
    }

    /// Read handle; may be created any number of times
    pub fn reader(&self) -> Reader<'_> {
        Reader::new(self.container.as_ref().map(|c| c as &dyn PagedColumns))
    }

    /// Write handle that rejects every mutation
    pub fn writer(&self) -> Writer {
        Writer::new()
    }

    /// Nothing to release beyond what owners already drop; always succeeds
    pub fn close(&self) -> Result<()> {
        Ok(())
    }
}
