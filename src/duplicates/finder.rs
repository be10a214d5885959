//! File-level duplicate finder.
//!
//! # Overview
//!
//! This module turns directories into duplicate groups:
//! 1. **Walk** - collect files from every root (see [`crate::scanner`])
//! 2. **Detect** - feed them to a [`DupDetector`] over a [`FileSource`]
//! 3. **Report** - map clusters back to paths as [`DuplicateGroup`]s
//!
//! # Example
//!
//! ```no_run
//! use chunkdupe::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default().with_chunk_size(4096);
//! let finder = DuplicateFinder::new(config);
//!
//! let (groups, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//! println!("Found {} duplicate groups", summary.duplicate_groups);
//! println!("Read {} of {} bytes", summary.bytes_read, summary.total_size);
//! ```

use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::detector::{DetectError, DupDetector};
use super::groups::DuplicateGroup;
use crate::hasher::HashAlgorithm;
use crate::progress::ProgressCallback;
use crate::scanner::{FileEntry, Walker, WalkerConfig};
use crate::source::file::DEFAULT_MAX_OPEN_HANDLES;
use crate::source::{FileSource, ItemSource, SourceError};

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Maximum bytes read from a file per round
    pub chunk_size: usize,
    /// Chunk hash combiner
    pub hash: HashAlgorithm,
    /// Directory walking options
    pub walker: WalkerConfig,
    /// Report clusters with a single file as well
    pub include_unique: bool,
    /// Maximum files held open at once while comparing
    pub max_open_files: usize,
    /// Optional progress callback
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("chunk_size", &self.chunk_size)
            .field("hash", &self.hash)
            .field("walker", &self.walker)
            .field("include_unique", &self.include_unique)
            .field("max_open_files", &self.max_open_files)
            .field("has_progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            hash: HashAlgorithm::default(),
            walker: WalkerConfig::default(),
            include_unique: false,
            max_open_files: DEFAULT_MAX_OPEN_HANDLES,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the hash combiner algorithm.
    #[must_use]
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker = config;
        self
    }

    /// Report single-file clusters too.
    #[must_use]
    pub fn with_include_unique(mut self, enabled: bool) -> Self {
        self.include_unique = enabled;
        self
    }

    /// Cap the number of files held open at once.
    #[must_use]
    pub fn with_max_open_files(mut self, max_open_files: usize) -> Self {
        self.max_open_files = max_open_files;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files compared
    pub total_files: usize,
    /// Combined size of all compared files
    pub total_size: u64,
    /// Reported groups with more than one file
    pub duplicate_groups: usize,
    /// Redundant copies across all groups
    pub duplicate_files: usize,
    /// Bytes that removing the redundant copies would free
    pub reclaimable_space: u64,
    /// Detector refinement rounds
    pub rounds: usize,
    /// Chunks read by the detector
    pub chunks_read: u64,
    /// Bytes read by the detector
    pub bytes_read: u64,
    /// Entries the walker could not access
    pub walk_errors: usize,
    /// Files skipped because they could not be opened before comparing
    pub failed_files: usize,
    /// Wall-clock duration of the scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Percentage of the total content that had to be read.
    #[must_use]
    pub fn read_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.bytes_read as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Human-readable reclaimable space.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Human-readable total size.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }

    /// Human-readable bytes read.
    #[must_use]
    pub fn bytes_read_display(&self) -> String {
        ByteSize::b(self.bytes_read).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The file source could not be set up.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Duplicate detection failed.
    #[error(transparent)]
    Detect(#[from] DetectError),
}

/// Duplicate finder over local directories.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find duplicate files below the given roots.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if a root does not exist or is not a
    /// directory, or if detection fails. Unreadable entries found while
    /// walking are logged and counted in the summary.
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        for root in roots {
            if !root.exists() {
                return Err(FinderError::PathNotFound(root.clone()));
            }
            if !root.is_dir() {
                return Err(FinderError::NotADirectory(root.clone()));
            }
        }

        let (files, walk_errors) = self.collect_files(roots);

        let (groups, mut summary) = self.find_duplicates_in_files(files)?;
        summary.walk_errors = walk_errors;
        summary.scan_duration = start_time.elapsed();

        Ok((groups, summary))
    }

    /// Find duplicates among an explicit list of files.
    ///
    /// Files that cannot be opened are logged, counted in
    /// `failed_files` and left out.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if a file fails while it is being compared.
    pub fn find_duplicates_in_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let (files, failed_files) = readable_files(files);
        let mut summary = ScanSummary {
            total_files: files.len(),
            total_size: files.iter().map(|f| f.size).sum(),
            failed_files,
            ..ScanSummary::default()
        };

        if files.len() < 2 {
            log::info!("{} file(s) found, nothing to compare", files.len());
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        let paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
        let source = FileSource::new(paths, self.config.chunk_size)?
            .with_max_open_handles(self.config.max_open_files);
        let mut detector = DupDetector::new(source, self.config.hash.combiner())?;
        if let Some(ref callback) = self.config.progress_callback {
            detector = detector.with_progress_callback(callback.clone());
        }

        log::info!(
            "Comparing {} files using {} with {}-byte chunks",
            summary.total_files,
            self.config.hash,
            self.config.chunk_size
        );
        detector.detect()?;

        let mut groups = Vec::new();
        for cluster in detector.result().unwrap_or(&[]) {
            if cluster.len() < 2 && !self.config.include_unique {
                continue;
            }

            let source = detector.source();
            let mut files = Vec::with_capacity(cluster.len());
            let mut size = 0;
            for &id in cluster {
                size = source.stats(id)?.original_size;
                if let Some(path) = source.path(id) {
                    files.push(path.to_path_buf());
                }
            }
            files.sort();
            groups.push(DuplicateGroup::new(size, files));
        }

        groups.sort_by(|a, b| {
            b.wasted_space()
                .cmp(&a.wasted_space())
                .then_with(|| b.len().cmp(&a.len()))
                .then_with(|| a.files.first().cmp(&b.files.first()))
        });

        let stats = detector.stats();
        summary.rounds = stats.rounds;
        summary.chunks_read = stats.chunks_read;
        summary.bytes_read = stats.bytes_read;
        for group in groups.iter().filter(|g| g.has_duplicates()) {
            summary.duplicate_groups += 1;
            summary.duplicate_files += group.duplicate_count();
            summary.reclaimable_space += group.wasted_space();
        }
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Found {} duplicate groups ({} reclaimable), read {} of {} ({:.1}%)",
            summary.duplicate_groups,
            summary.reclaimable_display(),
            summary.bytes_read_display(),
            summary.total_size_display(),
            summary.read_percentage()
        );

        Ok((groups, summary))
    }

    /// Walk every root, skipping files already reached through another root.
    fn collect_files(&self, roots: &[PathBuf]) -> (Vec<FileEntry>, usize) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files = Vec::new();
        let mut errors = 0;

        for root in roots {
            let walker = Walker::new(root, self.config.walker.clone());
            for entry in walker.walk() {
                match entry {
                    Ok(file) => {
                        if !seen.insert(canonical(&file.path)) {
                            log::debug!("Skipping file reached twice: {}", file.path.display());
                            continue;
                        }
                        if let Some(ref callback) = self.config.progress_callback {
                            callback.on_progress(files.len() + 1, &file.path.to_string_lossy());
                        }
                        files.push(file);
                    }
                    Err(e) => {
                        log::debug!("Walk error: {}", e);
                        errors += 1;
                    }
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        log::debug!("Collected {} files ({} walk errors)", files.len(), errors);
        (files, errors)
    }
}

/// Drop files that can no longer be opened, returning how many were dropped.
fn readable_files(files: Vec<FileEntry>) -> (Vec<FileEntry>, usize) {
    let mut failed = 0;
    let readable = files
        .into_iter()
        .filter(|file| match check_readable(&file.path) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping unreadable file {}: {}", file.path.display(), e);
                failed += 1;
                false
            }
        })
        .collect();
    (readable, failed)
}

fn check_readable(path: &Path) -> io::Result<()> {
    if !fs::metadata(path)?.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    File::open(path).map(drop)
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &TempDir, name: &str, content: &[u8]) -> FileEntry {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        FileEntry::new(path, content.len() as u64)
    }

    #[test]
    fn test_finder_config_default() {
        let config = FinderConfig::default();
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.hash, HashAlgorithm::Xxh3);
        assert!(!config.include_unique);
        assert!(config.progress_callback.is_none());
    }

    #[test]
    fn test_finder_config_builder() {
        let config = FinderConfig::default()
            .with_chunk_size(64)
            .with_hash(HashAlgorithm::Blake3)
            .with_include_unique(true);

        assert_eq!(config.chunk_size, 64);
        assert_eq!(config.hash, HashAlgorithm::Blake3);
        assert!(config.include_unique);
    }

    #[test]
    fn test_scan_summary_read_percentage() {
        let summary = ScanSummary {
            total_size: 200,
            bytes_read: 50,
            ..ScanSummary::default()
        };
        assert!((summary.read_percentage() - 25.0).abs() < f64::EPSILON);
        assert_eq!(ScanSummary::default().read_percentage(), 0.0);
    }

    #[test]
    fn test_fewer_than_two_files() {
        let dir = TempDir::new().unwrap();
        let file = create_test_file(&dir, "only.txt", b"alone");

        let finder = DuplicateFinder::with_defaults();
        let (groups, summary) = finder.find_duplicates_in_files(vec![file]).unwrap();
        assert!(groups.is_empty());
        assert_eq!(summary.total_files, 1);
        assert_eq!(summary.rounds, 0);
    }

    #[test]
    fn test_identical_and_distinct_files() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            create_test_file(&dir, "a.txt", b"identical content"),
            create_test_file(&dir, "b.txt", b"identical content"),
            create_test_file(&dir, "c.txt", b"different content"),
        ];

        let finder = DuplicateFinder::new(FinderConfig::default().with_chunk_size(4));
        let (groups, summary) = finder.find_duplicates_in_files(files).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size, 17);
        assert_eq!(
            groups[0].files,
            vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
        );
        assert_eq!(summary.duplicate_groups, 1);
        assert_eq!(summary.duplicate_files, 1);
        assert_eq!(summary.reclaimable_space, 17);
    }

    #[test]
    fn test_include_unique_reports_every_file() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            create_test_file(&dir, "a.txt", b"one"),
            create_test_file(&dir, "b.txt", b"two"),
            create_test_file(&dir, "c.txt", b"one"),
        ];

        let finder = DuplicateFinder::new(FinderConfig::default().with_include_unique(true));
        let (groups, summary) = finder.find_duplicates_in_files(files).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.iter().map(DuplicateGroup::len).sum::<usize>(), 3);
        assert_eq!(summary.duplicate_groups, 1);
        // Duplicates sort first
        assert!(groups[0].has_duplicates());
    }

    #[test]
    fn test_missing_file_is_skipped_and_counted() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            create_test_file(&dir, "a.txt", b"same"),
            create_test_file(&dir, "b.txt", b"same"),
            FileEntry::new(dir.path().join("gone.txt"), 4),
        ];

        let finder = DuplicateFinder::with_defaults();
        let (groups, summary) = finder.find_duplicates_in_files(files).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].files,
            vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
        );
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.failed_files, 1);
    }

    #[test]
    fn test_directory_in_file_list_is_skipped() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            create_test_file(&dir, "a.txt", b"x"),
            FileEntry::new(dir.path().to_path_buf(), 0),
        ];

        let finder = DuplicateFinder::with_defaults();
        let (groups, summary) = finder.find_duplicates_in_files(files).unwrap();

        assert!(groups.is_empty());
        assert_eq!(summary.total_files, 1);
        assert_eq!(summary.failed_files, 1);
    }

    #[test]
    fn test_many_identical_files_under_open_file_cap() {
        let dir = TempDir::new().unwrap();
        let content = vec![7u8; 4096];
        let files: Vec<FileEntry> = (0..200)
            .map(|i| create_test_file(&dir, &format!("f{i}"), &content))
            .collect();

        let finder = DuplicateFinder::new(FinderConfig::default().with_max_open_files(16));
        let (groups, summary) = finder.find_duplicates_in_files(files).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 200);
        assert_eq!(summary.bytes_read, 200 * 4096);
    }

    #[test]
    fn test_find_duplicates_missing_root() {
        let finder = DuplicateFinder::with_defaults();
        let result = finder.find_duplicates(&[PathBuf::from("/nonexistent/root/12345")]);
        assert!(matches!(result, Err(FinderError::PathNotFound(_))));
    }

    #[test]
    fn test_find_duplicates_root_is_file() {
        let dir = TempDir::new().unwrap();
        let file = create_test_file(&dir, "file.txt", b"x");

        let finder = DuplicateFinder::with_defaults();
        let result = finder.find_duplicates(&[file.path]);
        assert!(matches!(result, Err(FinderError::NotADirectory(_))));
    }

    #[test]
    fn test_same_root_twice_counts_files_once() {
        let dir = TempDir::new().unwrap();
        create_test_file(&dir, "a.txt", b"same");
        create_test_file(&dir, "b.txt", b"same");

        let finder = DuplicateFinder::with_defaults();
        let roots = vec![dir.path().to_path_buf(), dir.path().to_path_buf()];
        let (groups, summary) = finder.find_duplicates(&roots).unwrap();

        assert_eq!(summary.total_files, 2);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }
}
