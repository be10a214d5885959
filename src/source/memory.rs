//! In-memory item source.
//!
//! Serves byte vectors held in memory, chunk by chunk. Used for tests,
//! benchmarks, and callers that already have their content loaded.

use super::{index_of, ItemId, ItemSource, ItemStats, SourceError};

/// Item source over a list of in-memory byte vectors.
///
/// Item ids are the vector indices, enumerated in order.
#[derive(Debug, Clone)]
pub struct MemorySource {
    items: Vec<(Vec<u8>, ItemStats)>,
    chunk_size: usize,
}

impl MemorySource {
    /// Create a source over `data`, handing out chunks of at most
    /// `chunk_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ZeroChunkSize`] if `chunk_size` is zero.
    pub fn new(data: Vec<Vec<u8>>, chunk_size: usize) -> Result<Self, SourceError> {
        if chunk_size == 0 {
            return Err(SourceError::ZeroChunkSize);
        }

        let items = data
            .into_iter()
            .map(|bytes| {
                let stats = ItemStats::new(bytes.len() as u64);
                (bytes, stats)
            })
            .collect();

        Ok(Self { items, chunk_size })
    }

    /// Number of items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the source holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Configured maximum chunk size.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl ItemSource for MemorySource {
    fn enumerate(&mut self) -> Result<Vec<ItemId>, SourceError> {
        Ok((0..self.items.len() as ItemId).collect())
    }

    fn stats(&self, id: ItemId) -> Result<ItemStats, SourceError> {
        let idx = index_of(id, self.items.len())?;
        Ok(self.items[idx].1)
    }

    fn next_chunk(&mut self, id: ItemId) -> Result<&[u8], SourceError> {
        let idx = index_of(id, self.items.len())?;
        let chunk_size = self.chunk_size as u64;
        let (data, stats) = &mut self.items[idx];

        if stats.is_exhausted() {
            return Err(SourceError::Exhausted(id));
        }

        let begin = stats.consumed();
        let end = (begin + chunk_size).min(stats.original_size);
        stats.remaining_size -= end - begin;

        Ok(&data[begin as usize..end as usize])
    }
}
