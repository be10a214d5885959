use chunkdupe::duplicates::{DuplicateFinder, FinderConfig};
use chunkdupe::hasher::HashAlgorithm;
use chunkdupe::scanner::WalkerConfig;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn roots(dir: &tempfile::TempDir) -> Vec<PathBuf> {
    vec![dir.path().to_path_buf()]
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(&roots(&dir)).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert_eq!(summary.rounds, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"content a").unwrap();
    fs::write(dir.path().join("b.txt"), b"content b").unwrap();
    fs::write(dir.path().join("c.txt"), b"content c").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&roots(&dir)).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"duplicate").unwrap();
    fs::write(dir.path().join("b.txt"), b"duplicate").unwrap();
    fs::write(dir.path().join("c.txt"), b"unique").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&roots(&dir)).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(groups[0].size, 9);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 9);
}

#[test]
fn test_scan_empty_files_group_together() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("empty1"), b"").unwrap();
    fs::write(dir.path().join("empty2"), b"").unwrap();
    fs::write(dir.path().join("full"), b"data").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(&roots(&dir)).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 0);
    assert_eq!(
        groups[0].files,
        vec![dir.path().join("empty1"), dir.path().join("empty2")]
    );
}

#[test]
fn test_scan_same_prefix_different_length() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("short"), vec![b'x'; 100]).unwrap();
    fs::write(dir.path().join("long"), vec![b'x'; 150]).unwrap();

    let config = FinderConfig::default().with_chunk_size(10);
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(&roots(&dir))
        .unwrap();

    assert!(groups.is_empty());
}

#[test]
fn test_scan_reads_less_for_early_divergence() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), vec![1u8; 64 * 1024]).unwrap();
    fs::write(dir.path().join("b.bin"), vec![2u8; 64 * 1024]).unwrap();

    let config = FinderConfig::default().with_chunk_size(1024);
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(&roots(&dir))
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_size, 128 * 1024);
    assert_eq!(summary.bytes_read, 2 * 1024);
    assert!(summary.read_percentage() < 2.0);
}

#[test]
fn test_scan_every_hash_algorithm_agrees() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"alpha beta gamma").unwrap();
    fs::write(dir.path().join("b"), b"alpha beta gamma").unwrap();
    fs::write(dir.path().join("c"), b"alpha beta delta").unwrap();

    for hash in [
        HashAlgorithm::Xxh3,
        HashAlgorithm::Blake3,
        HashAlgorithm::Multiplicative,
    ] {
        let config = FinderConfig::default().with_chunk_size(3).with_hash(hash);
        let (groups, _) = DuplicateFinder::new(config)
            .find_duplicates(&roots(&dir))
            .unwrap();

        assert_eq!(groups.len(), 1, "{hash}");
        assert_eq!(
            groups[0].files,
            vec![dir.path().join("a"), dir.path().join("b")],
            "{hash}"
        );
    }
}

#[test]
fn test_scan_top_level_only_unless_recursive() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(sub.join("b.txt"), b"same").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(&dir))
        .unwrap();
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        recursive: true,
        ..Default::default()
    });
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(&roots(&dir))
        .unwrap();
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_scan_groups_sorted_by_wasted_space() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("small1"), vec![1u8; 10]).unwrap();
    fs::write(dir.path().join("small2"), vec![1u8; 10]).unwrap();
    fs::write(dir.path().join("big1"), vec![2u8; 1000]).unwrap();
    fs::write(dir.path().join("big2"), vec![2u8; 1000]).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(&dir))
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].size, 1000);
    assert_eq!(groups[1].size, 10);
    assert_eq!(summary.reclaimable_space, 1010);
}

#[test]
fn test_scan_size_filters() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("tiny1"), b"ab").unwrap();
    fs::write(dir.path().join("tiny2"), b"ab").unwrap();
    fs::write(dir.path().join("big1"), vec![0u8; 500]).unwrap();
    fs::write(dir.path().join("big2"), vec![0u8; 500]).unwrap();

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        min_size: Some(100),
        ..Default::default()
    });
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(&roots(&dir))
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 500);
}
