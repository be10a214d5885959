//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Incremental chunk-by-chunk refinement of candidate groups ([`detector`])
//! - Group bookkeeping keyed by running chunk hash ([`groups`])
//! - Directory-level duplicate finding built on both ([`finder`])

pub mod detector;
pub mod finder;
pub mod groups;

pub use detector::{
    Cluster, DetectError, DetectionStats, DetectorState, DupDetector, RoundStats,
};
pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary, DEFAULT_CHUNK_SIZE};
pub use groups::{DuplicateGroup, GroupKey, GroupMap};
