//! Group keys, the per-round group map, and reported duplicate groups.
//!
//! # Overview
//!
//! During detection every item sits under exactly one [`GroupKey`]: the
//! hash of everything read from it so far, or `None` for items that were
//! empty from the start. The [`GroupMap`] holds that association for one
//! refinement round and is rebuilt from scratch for the next round.
//!
//! Once detection finishes, the file-level pipeline turns clusters back
//! into [`DuplicateGroup`]s that carry paths and sizes for reporting.
//!
//! # Example
//!
//! ```
//! use chunkdupe::duplicates::GroupMap;
//!
//! let mut map = GroupMap::new();
//! map.insert(Some(7), 0);
//! map.insert(None, 1);
//! map.insert(Some(7), 2);
//!
//! assert_eq!(map.len(), 3);
//! assert_eq!(map.group_count(), 2);
//! assert_eq!(map.equal_range(&Some(7)), &[0, 2]);
//!
//! let visited: usize = map.groups().map(|(_, members)| members.len()).sum();
//! assert_eq!(visited, map.len());
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::hasher::HashValue;
use crate::source::ItemId;

/// Key an item is grouped under.
///
/// `None` is reserved for items whose original size is zero; it is
/// assigned once and never re-hashed. `Some(h)` holds the running hash of
/// every chunk read from the item so far.
pub type GroupKey = Option<HashValue>;

/// Multi-valued association from group key to member items.
///
/// Groups are visited in the order their key was first inserted, which
/// keeps traversal (and therefore reported cluster order) deterministic
/// for a given insertion sequence.
#[derive(Debug, Clone, Default)]
pub struct GroupMap {
    buckets: HashMap<GroupKey, Vec<ItemId>>,
    order: Vec<GroupKey>,
    len: usize,
}

impl GroupMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map sized for `items` members.
    #[must_use]
    pub fn with_capacity(items: usize) -> Self {
        Self {
            buckets: HashMap::with_capacity(items),
            order: Vec::with_capacity(items),
            len: 0,
        }
    }

    /// Add `item` under `key`.
    pub fn insert(&mut self, key: GroupKey, item: ItemId) {
        match self.buckets.entry(key) {
            Entry::Occupied(mut members) => members.get_mut().push(item),
            Entry::Vacant(slot) => {
                self.order.push(key);
                slot.insert(vec![item]);
            }
        }
        self.len += 1;
    }

    /// Members stored under `key`, empty if the key is absent.
    #[must_use]
    pub fn equal_range(&self, key: &GroupKey) -> &[ItemId] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of members across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the map holds no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.order.len()
    }

    /// Iterate over every distinct key exactly once, with its members.
    pub fn groups(&self) -> impl Iterator<Item = (GroupKey, &[ItemId])> + '_ {
        self.order
            .iter()
            .map(move |key| (*key, self.equal_range(key)))
    }

    /// Call `process` once per distinct key and return how many groups
    /// were visited.
    pub fn for_each_group<F>(&self, mut process: F) -> usize
    where
        F: FnMut(GroupKey, &[ItemId]),
    {
        let mut visited = 0;
        for (key, members) in self.groups() {
            debug_assert!(!members.is_empty());
            process(key, members);
            visited += 1;
        }
        debug_assert_eq!(visited, self.group_count());
        visited
    }
}

/// Confirmed group of files with identical content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// File size in bytes (shared by all files in the group)
    pub size: u64,
    /// Paths of the files in this group
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(size: u64, files: Vec<PathBuf>) -> Self {
        Self { size, files }
    }

    /// Number of files in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if the group holds more than one file.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }

    /// Total size of all files in the group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Space taken by the redundant copies (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * (self.files.len().saturating_sub(1)) as u64
    }

    /// Number of redundant copies.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }
}
