//! Local file item source.
//!
//! Each path becomes one item. Sizes are taken from file metadata when the
//! source is enumerated. File handles are opened on the first chunk read
//! and closed as soon as the item has been read to the end. At most
//! [`DEFAULT_MAX_OPEN_HANDLES`] (or the configured cap) are held at once:
//! the least recently read handle is closed to make room, and the file is
//! reopened at its read offset when its next chunk is needed.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::{index_of, ItemId, ItemSource, ItemStats, SourceError};

#[derive(Debug)]
struct FileItem {
    path: PathBuf,
    stats: ItemStats,
    handle: Option<File>,
}

impl FileItem {
    /// Open the file positioned at the first unread byte.
    fn open(&self) -> Result<File, SourceError> {
        let io_error = |source| SourceError::Io {
            path: self.path.clone(),
            source,
        };

        log::trace!("Opening {}", self.path.display());
        let mut file = File::open(&self.path).map_err(io_error)?;
        let offset = self.stats.consumed();
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).map_err(io_error)?;
        }
        Ok(file)
    }
}

/// Default cap on simultaneously open files.
pub const DEFAULT_MAX_OPEN_HANDLES: usize = 64;

/// Item source over a list of local files.
///
/// # Example
///
/// ```no_run
/// use chunkdupe::source::{FileSource, ItemSource};
/// use std::path::PathBuf;
///
/// let paths = vec![PathBuf::from("a.bin"), PathBuf::from("b.bin")];
/// let mut source = FileSource::new(paths, 1024).unwrap();
///
/// for id in source.enumerate().unwrap() {
///     println!("{}: {} bytes", id, source.stats(id).unwrap().original_size);
/// }
/// ```
#[derive(Debug)]
pub struct FileSource {
    paths: Vec<PathBuf>,
    items: Vec<FileItem>,
    chunk_size: usize,
    buffer: Vec<u8>,
    max_open: usize,
    /// Indices of items holding a handle, least recently read first
    open_order: VecDeque<usize>,
}

impl FileSource {
    /// Create a source over `paths`, reading chunks of at most `chunk_size`
    /// bytes. Files are not touched until [`ItemSource::enumerate`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ZeroChunkSize`] if `chunk_size` is zero.
    pub fn new(paths: Vec<PathBuf>, chunk_size: usize) -> Result<Self, SourceError> {
        if chunk_size == 0 {
            return Err(SourceError::ZeroChunkSize);
        }

        Ok(Self {
            paths,
            items: Vec::new(),
            chunk_size,
            buffer: Vec::new(),
            max_open: DEFAULT_MAX_OPEN_HANDLES,
            open_order: VecDeque::new(),
        })
    }

    /// Cap the number of files held open at once (at least one).
    #[must_use]
    pub fn with_max_open_handles(mut self, max_open: usize) -> Self {
        self.max_open = max_open.max(1);
        self
    }

    /// Path of an enumerated item.
    #[must_use]
    pub fn path(&self, id: ItemId) -> Option<&Path> {
        index_of(id, self.items.len())
            .ok()
            .map(|idx| self.items[idx].path.as_path())
    }

    /// Number of files currently held open.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.items.iter().filter(|item| item.handle.is_some()).count()
    }

    /// Keep `handle` for item `idx`, closing the least recently read
    /// handles beyond the cap.
    fn park(&mut self, idx: usize, handle: File) {
        while self.open_order.len() >= self.max_open {
            let Some(evicted) = self.open_order.pop_front() else {
                break;
            };
            log::trace!(
                "Closing {} to stay under the open file cap",
                self.items[evicted].path.display()
            );
            self.items[evicted].handle = None;
        }

        self.open_order.push_back(idx);
        self.items[idx].handle = Some(handle);
    }

    fn is_enumerated(&self) -> bool {
        !self.items.is_empty() || self.paths.is_empty()
    }

    fn inspect(path: PathBuf) -> Result<FileItem, SourceError> {
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(source) => return Err(SourceError::Io { path, source }),
        };

        if !metadata.is_file() {
            return Err(SourceError::Io {
                path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a regular file",
                ),
            });
        }

        Ok(FileItem {
            stats: ItemStats::new(metadata.len()),
            path,
            handle: None,
        })
    }
}

impl ItemSource for FileSource {
    fn enumerate(&mut self) -> Result<Vec<ItemId>, SourceError> {
        if !self.is_enumerated() {
            let items = self
                .paths
                .iter()
                .cloned()
                .map(Self::inspect)
                .collect::<Result<Vec<_>, _>>()?;

            log::debug!("Enumerated {} files", items.len());
            self.items = items;
        }

        Ok((0..self.items.len() as ItemId).collect())
    }

    fn stats(&self, id: ItemId) -> Result<ItemStats, SourceError> {
        let idx = index_of(id, self.items.len())?;
        Ok(self.items[idx].stats)
    }

    fn next_chunk(&mut self, id: ItemId) -> Result<&[u8], SourceError> {
        let idx = index_of(id, self.items.len())?;
        let stats = self.items[idx].stats;

        if stats.is_exhausted() {
            return Err(SourceError::Exhausted(id));
        }

        let len = (self.chunk_size as u64).min(stats.remaining_size) as usize;

        let mut handle = match self.items[idx].handle.take() {
            Some(handle) => {
                self.open_order.retain(|&open| open != idx);
                handle
            }
            None => self.items[idx].open()?,
        };

        self.buffer.resize(len, 0);
        let item = &mut self.items[idx];
        handle
            .read_exact(&mut self.buffer[..len])
            .map_err(|source| SourceError::Io {
                path: item.path.clone(),
                source,
            })?;

        item.stats.remaining_size -= len as u64;
        if item.stats.is_exhausted() {
            log::trace!("Finished reading {}", item.path.display());
        } else {
            self.park(idx, handle);
        }

        Ok(&self.buffer[..len])
    }
}
