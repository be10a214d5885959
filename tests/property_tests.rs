use std::collections::HashMap;

use chunkdupe::duplicates::{Cluster, DupDetector};
use chunkdupe::hasher::{HashAlgorithm, MultiplicativeCombiner, Xxh3Combiner};
use chunkdupe::source::{ItemId, MemorySource};
use proptest::prelude::*;

/// Items drawn from a small alphabet so that duplicates and shared
/// prefixes are common.
fn items() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(0u8..3, 0..12), 2..16)
}

fn algorithm() -> impl Strategy<Value = HashAlgorithm> {
    prop_oneof![
        Just(HashAlgorithm::Xxh3),
        Just(HashAlgorithm::Blake3),
        Just(HashAlgorithm::Multiplicative),
    ]
}

fn normalize(clusters: &[Cluster]) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = clusters
        .iter()
        .map(|c| {
            let mut c = c.clone();
            c.sort_unstable();
            c
        })
        .collect();
    clusters.sort();
    clusters
}

/// Group items by full content.
fn naive_clusters(data: &[Vec<u8>]) -> Vec<Cluster> {
    let mut by_content: HashMap<&[u8], Cluster> = HashMap::new();
    for (id, content) in data.iter().enumerate() {
        by_content
            .entry(content.as_slice())
            .or_default()
            .push(id as ItemId);
    }
    normalize(&by_content.into_values().collect::<Vec<_>>())
}

proptest! {
    #[test]
    fn test_clusters_partition_items(
        data in items(),
        chunk_size in 1usize..6,
        algorithm in algorithm(),
    ) {
        let n = data.len();
        let source = MemorySource::new(data, chunk_size).unwrap();
        let mut detector = DupDetector::new(source, algorithm.combiner()).unwrap();
        detector.detect().unwrap();

        let clusters = detector.result().unwrap();
        prop_assert!(clusters.iter().all(|c| !c.is_empty()));

        let mut ids: Vec<ItemId> = clusters.iter().flatten().copied().collect();
        ids.sort_unstable();
        prop_assert_eq!(ids, (0..n as ItemId).collect::<Vec<_>>());
    }

    #[test]
    fn test_detect_twice_matches_once(data in items(), chunk_size in 1usize..6) {
        let mut once = DupDetector::new(
            MemorySource::new(data.clone(), chunk_size).unwrap(),
            Xxh3Combiner,
        ).unwrap();
        once.detect().unwrap();

        let mut twice = DupDetector::new(
            MemorySource::new(data, chunk_size).unwrap(),
            Xxh3Combiner,
        ).unwrap();
        twice.detect().unwrap();
        twice.detect().unwrap();

        prop_assert_eq!(once.result(), twice.result());
    }

    #[test]
    fn test_matches_full_content_grouping(
        data in items(),
        chunk_size in 1usize..6,
        algorithm in algorithm(),
    ) {
        let expected = naive_clusters(&data);
        let source = MemorySource::new(data, chunk_size).unwrap();
        let mut detector = DupDetector::new(source, algorithm.combiner()).unwrap();
        detector.detect().unwrap();

        prop_assert_eq!(normalize(detector.result().unwrap()), expected);
    }

    #[test]
    fn test_never_reads_more_than_content(data in items(), chunk_size in 1usize..6) {
        let total: u64 = data.iter().map(|d| d.len() as u64).sum();
        let source = MemorySource::new(data, chunk_size).unwrap();
        let mut detector = DupDetector::new(source, MultiplicativeCombiner).unwrap();
        detector.detect().unwrap();

        prop_assert!(detector.stats().bytes_read <= total);
    }
}
