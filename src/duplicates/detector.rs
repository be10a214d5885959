//! Incremental duplicate detector.
//!
//! # Overview
//!
//! [`DupDetector`] partitions the items of an [`ItemSource`] into clusters
//! of identical content without necessarily reading every item in full:
//!
//! 1. **Initialize** - every item is keyed by the hash of its first chunk,
//!    or by `None` if it is empty.
//! 2. **Refine** - each round, every member of a group with more than one
//!    member folds its next chunk into its key. Members with nothing left
//!    to read keep their key, so exhausted items stop consuming input.
//! 3. **Stop** - once a round reads nothing, or no group has more than one
//!    member, the current groups are final.
//!
//! Items whose first chunks differ are read exactly once. Items that keep
//! colliding are read until they diverge or run out.
//!
//! # Example
//!
//! ```
//! use chunkdupe::duplicates::DupDetector;
//! use chunkdupe::hasher::Xxh3Combiner;
//! use chunkdupe::source::MemorySource;
//!
//! let source = MemorySource::new(vec![vec![1, 2, 3], vec![], vec![1, 2, 3]], 1).unwrap();
//! let mut detector = DupDetector::new(source, Xxh3Combiner).unwrap();
//! assert!(detector.result().is_none());
//!
//! detector.detect().unwrap();
//! let clusters = detector.result().unwrap();
//! assert_eq!(clusters.len(), 2);
//! ```

use std::cell::OnceCell;
use std::sync::Arc;

use super::groups::GroupMap;
use crate::hasher::{HashCombiner, HashError, HashValue, INITIAL_SEED};
use crate::progress::ProgressCallback;
use crate::source::{ItemId, ItemSource, SourceError};

/// One final group of items with identical content.
pub type Cluster = Vec<ItemId>;

/// Lifecycle of a [`DupDetector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Constructed, nothing read yet.
    Idle,
    /// Initial groups built from first chunks.
    Initialized,
    /// Refinement rounds in progress.
    Iterating,
    /// Groups are final; results are available.
    Done,
    /// A collaborator error aborted detection.
    Failed,
}

/// What a single refinement round did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Round number (1-based)
    pub round: usize,
    /// Groups traversed
    pub groups: usize,
    /// Groups with more than one member
    pub multi_member_groups: usize,
    /// Items a chunk was read from
    pub items_read: usize,
    /// Bytes read during the round
    pub bytes_read: u64,
}

impl RoundStats {
    /// True if at least one member of a multi-member group still had data.
    #[must_use]
    pub fn any_item_had_remaining_data(&self) -> bool {
        self.items_read > 0
    }

    /// True if at least one group had more than one member.
    #[must_use]
    pub fn any_group_had_multiple_members(&self) -> bool {
        self.multi_member_groups > 0
    }

    /// True if the groups produced by this round are final.
    #[must_use]
    pub fn is_final(&self) -> bool {
        !self.any_item_had_remaining_data() || !self.any_group_had_multiple_members()
    }
}

/// Cumulative counters for one detection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionStats {
    /// Items enumerated
    pub items: usize,
    /// Refinement rounds executed
    pub rounds: usize,
    /// Chunks read, including the initial ones
    pub chunks_read: u64,
    /// Bytes read, including the initial chunks
    pub bytes_read: u64,
}

/// Errors that can occur during duplicate detection.
///
/// Apart from [`DetectError::TooFewItems`], every variant signals a
/// collaborator that broke its contract; the run is abandoned.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    /// Fewer than two items were enumerated.
    #[error("Duplicate detection needs at least 2 items, got {0}")]
    TooFewItems(usize),

    /// The item source failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The hash combiner failed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// An item that was empty at enumeration reported unread data.
    #[error("Item {0} was empty at enumeration but now reports unread data")]
    EmptyItemGrew(ItemId),

    /// An earlier `detect` call failed; the detector cannot be reused.
    #[error("Detection was aborted by an earlier error")]
    Aborted,
}

/// Run-once incremental duplicate detector.
///
/// Owns its item source and hash combiner. [`detect`](Self::detect) runs
/// the refinement loop to completion; [`result`](Self::result) returns the
/// final clusters, computed on first access and cached.
pub struct DupDetector<S, H> {
    source: S,
    hasher: H,
    items: Vec<ItemId>,
    state: DetectorState,
    groups: GroupMap,
    stats: DetectionStats,
    clusters: OnceCell<Vec<Cluster>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl<S, H> std::fmt::Debug for DupDetector<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DupDetector")
            .field("items", &self.items.len())
            .field("state", &self.state)
            .field("groups", &self.groups.group_count())
            .field("stats", &self.stats)
            .field("has_progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl<S: ItemSource, H: HashCombiner> DupDetector<S, H> {
    /// Create a detector, enumerating the source once.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::TooFewItems`] if the source holds fewer than
    /// two items, or the source's error if enumeration fails.
    pub fn new(mut source: S, hasher: H) -> Result<Self, DetectError> {
        let items = source.enumerate()?;
        if items.len() < 2 {
            return Err(DetectError::TooFewItems(items.len()));
        }

        log::debug!("Detector created over {} items", items.len());

        Ok(Self {
            source,
            hasher,
            stats: DetectionStats {
                items: items.len(),
                ..DetectionStats::default()
            },
            items,
            state: DetectorState::Idle,
            groups: GroupMap::new(),
            clusters: OnceCell::new(),
            progress_callback: None,
        })
    }

    /// Report progress to `callback` while detecting.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> &DetectionStats {
        &self.stats
    }

    /// Ids enumerated at construction, in enumeration order.
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// The item source, e.g. to map ids back to paths.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run detection to completion.
    ///
    /// Calling this again after success is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates any source or combiner error. After an error the detector
    /// is [`DetectorState::Failed`] and further calls return
    /// [`DetectError::Aborted`].
    pub fn detect(&mut self) -> Result<(), DetectError> {
        match self.state {
            DetectorState::Done => return Ok(()),
            DetectorState::Failed => return Err(DetectError::Aborted),
            _ => {}
        }

        if let Err(err) = self.run() {
            log::warn!("Detection aborted: {}", err);
            self.groups = GroupMap::new();
            self.transition(DetectorState::Failed);
            if let Some(ref callback) = self.progress_callback {
                callback.on_phase_end("detecting");
            }
            return Err(err);
        }

        Ok(())
    }

    /// Final clusters, or `None` until [`detect`](Self::detect) succeeded.
    ///
    /// Every enumerated item appears in exactly one cluster; singleton
    /// clusters are included.
    #[must_use]
    pub fn result(&self) -> Option<&[Cluster]> {
        if self.state != DetectorState::Done {
            return None;
        }

        let clusters = self.clusters.get_or_init(|| {
            let mut clusters = Vec::with_capacity(self.groups.group_count());
            self.groups
                .for_each_group(|_, members| clusters.push(members.to_vec()));
            clusters
        });

        Some(clusters.as_slice())
    }

    fn run(&mut self) -> Result<(), DetectError> {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("detecting", self.items.len());
        }

        self.groups = self.initialize()?;
        self.transition(DetectorState::Initialized);

        loop {
            self.transition(DetectorState::Iterating);
            let round = self.refine()?;
            if round.is_final() {
                break;
            }
        }

        self.transition(DetectorState::Done);

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("detecting");
        }

        log::info!(
            "Detection finished: {} items in {} groups after {} rounds ({} bytes read)",
            self.items.len(),
            self.groups.group_count(),
            self.stats.rounds,
            self.stats.bytes_read
        );

        Ok(())
    }

    /// Key every item by its first chunk, or `None` if it is empty.
    fn initialize(&mut self) -> Result<GroupMap, DetectError> {
        let mut groups = GroupMap::with_capacity(self.items.len());

        for &item in &self.items {
            let key = if self.source.stats(item)?.original_size == 0 {
                None
            } else {
                Some(Self::fold_next_chunk(
                    &mut self.source,
                    &self.hasher,
                    &mut self.stats,
                    item,
                    INITIAL_SEED,
                )?)
            };
            groups.insert(key, item);
        }

        debug_assert_eq!(groups.len(), self.items.len());
        log::debug!(
            "Initial grouping: {} items in {} groups",
            groups.len(),
            groups.group_count()
        );

        Ok(groups)
    }

    /// Run one round: advance every member of every multi-member group by
    /// one chunk, then swap in the regrouped map.
    fn refine(&mut self) -> Result<RoundStats, DetectError> {
        let current = std::mem::take(&mut self.groups);
        let mut next = GroupMap::with_capacity(current.len());
        let mut round = RoundStats {
            round: self.stats.rounds + 1,
            groups: current.group_count(),
            ..RoundStats::default()
        };

        if let Some(ref callback) = self.progress_callback {
            callback.on_progress(round.round, &format!("round {}", round.round));
        }

        for (key, members) in current.groups() {
            if let [item] = members {
                next.insert(key, *item);
                continue;
            }

            round.multi_member_groups += 1;

            for &item in members {
                if self.source.stats(item)?.is_exhausted() {
                    next.insert(key, item);
                    continue;
                }

                let seed = key.ok_or(DetectError::EmptyItemGrew(item))?;
                let before = self.stats.bytes_read;
                let hash = Self::fold_next_chunk(
                    &mut self.source,
                    &self.hasher,
                    &mut self.stats,
                    item,
                    seed,
                )?;

                round.items_read += 1;
                round.bytes_read += self.stats.bytes_read - before;
                next.insert(Some(hash), item);
            }
        }

        debug_assert_eq!(next.len(), current.len());
        self.groups = next;
        self.stats.rounds += 1;

        log::debug!(
            "Round {}: {} groups ({} multi-member), {} items read, {} bytes",
            round.round,
            round.groups,
            round.multi_member_groups,
            round.items_read,
            round.bytes_read
        );

        if let Some(ref callback) = self.progress_callback {
            callback.on_round_end(&round);
        }

        Ok(round)
    }

    /// Read the next chunk of `item` and fold it into `seed`.
    fn fold_next_chunk(
        source: &mut S,
        hasher: &H,
        stats: &mut DetectionStats,
        item: ItemId,
        seed: HashValue,
    ) -> Result<HashValue, DetectError> {
        let chunk = source.next_chunk(item)?;
        let hash = hasher.combine(chunk, seed)?;

        stats.chunks_read += 1;
        stats.bytes_read += chunk.len() as u64;

        Ok(hash)
    }

    fn transition(&mut self, next: DetectorState) {
        log::trace!("Detector state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
