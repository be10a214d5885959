//! Item sources feeding the duplicate detector.
//!
//! An item source enumerates opaque items, reports how much of each item
//! is left to read, and hands out successive chunks of raw bytes. The
//! detector only ever talks to items through the [`ItemSource`] trait, so
//! the same refinement loop runs over local files ([`file::FileSource`])
//! or in-memory data ([`memory::MemorySource`]).
//!
//! # Example
//!
//! ```
//! use chunkdupe::source::{ItemSource, MemorySource};
//!
//! let mut source = MemorySource::new(vec![vec![1, 2, 3], vec![]], 2).unwrap();
//! let ids = source.enumerate().unwrap();
//! assert_eq!(ids, vec![0, 1]);
//!
//! assert_eq!(source.next_chunk(0).unwrap(), &[1, 2]);
//! assert_eq!(source.stats(0).unwrap().remaining_size, 1);
//! ```

pub mod file;
pub mod memory;

use std::path::PathBuf;

pub use file::FileSource;
pub use memory::MemorySource;

/// Opaque identifier of one item, assigned by the source at enumeration.
pub type ItemId = u64;

/// Read progress of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemStats {
    /// Total size of the item in bytes.
    pub original_size: u64,
    /// Bytes not yet handed out by [`ItemSource::next_chunk`].
    pub remaining_size: u64,
}

impl ItemStats {
    /// Stats for an item nothing has been read from yet.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            original_size: size,
            remaining_size: size,
        }
    }

    /// True once every byte of the item has been read.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining_size == 0
    }

    /// Number of bytes already read.
    #[must_use]
    pub fn consumed(&self) -> u64 {
        self.original_size - self.remaining_size
    }
}

/// Capability set the detector needs from an item source.
///
/// Implementations must uphold:
/// - `enumerate` returns the same ids on every call;
/// - `next_chunk` returns a non-empty slice of at most the configured
///   chunk size while `remaining_size > 0`, and lowers `remaining_size`
///   by exactly the slice length;
/// - `next_chunk` on an exhausted item fails with [`SourceError::Exhausted`].
pub trait ItemSource {
    /// Enumerate all items, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying items cannot be inspected.
    fn enumerate(&mut self) -> Result<Vec<ItemId>, SourceError>;

    /// Current read progress of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::OutOfRange`] if `id` was never enumerated.
    fn stats(&self, id: ItemId) -> Result<ItemStats, SourceError>;

    /// Read the next unread chunk of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::OutOfRange`] for unknown ids,
    /// [`SourceError::Exhausted`] when nothing is left to read, or an I/O
    /// error from the backing storage.
    fn next_chunk(&mut self, id: ItemId) -> Result<&[u8], SourceError>;
}

impl<S: ItemSource + ?Sized> ItemSource for Box<S> {
    fn enumerate(&mut self) -> Result<Vec<ItemId>, SourceError> {
        (**self).enumerate()
    }

    fn stats(&self, id: ItemId) -> Result<ItemStats, SourceError> {
        (**self).stats(id)
    }

    fn next_chunk(&mut self, id: ItemId) -> Result<&[u8], SourceError> {
        (**self).next_chunk(id)
    }
}

impl<S: ItemSource + ?Sized> ItemSource for &mut S {
    fn enumerate(&mut self) -> Result<Vec<ItemId>, SourceError> {
        (**self).enumerate()
    }

    fn stats(&self, id: ItemId) -> Result<ItemStats, SourceError> {
        (**self).stats(id)
    }

    fn next_chunk(&mut self, id: ItemId) -> Result<&[u8], SourceError> {
        (**self).next_chunk(id)
    }
}

/// Errors raised by item sources.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// The id was never handed out by `enumerate`.
    #[error("Item {0} is out of range")]
    OutOfRange(ItemId),

    /// A chunk was requested from an item with nothing left to read.
    #[error("Item {0} has no data left to read")]
    Exhausted(ItemId),

    /// The source was configured with a chunk size of zero.
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,

    /// An I/O error occurred while accessing an item's backing file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Convert an enumerated id into a vector index.
pub(crate) fn index_of(id: ItemId, len: usize) -> Result<usize, SourceError> {
    usize::try_from(id)
        .ok()
        .filter(|&idx| idx < len)
        .ok_or(SourceError::OutOfRange(id))
}
