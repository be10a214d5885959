use chunkdupe::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use chunkdupe::scanner::WalkerConfig;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_duplicates_across_roots() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("photo.jpg"), b"jpeg bytes").unwrap();
    fs::write(second.path().join("copy.jpg"), b"jpeg bytes").unwrap();
    fs::write(second.path().join("other.jpg"), b"png bytes!").unwrap();

    let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots)
        .unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(groups.len(), 1);
    assert!(groups[0].files.contains(&first.path().join("photo.jpg")));
    assert!(groups[0].files.contains(&second.path().join("copy.jpg")));
}

#[test]
fn test_nested_root_files_counted_once() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("a"), b"one").unwrap();
    fs::write(nested.join("b"), b"one").unwrap();

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        recursive: true,
        ..Default::default()
    });
    let roots = vec![dir.path().to_path_buf(), nested];
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(&roots)
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_invalid_root_fails_before_scanning() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"x").unwrap();

    let roots = vec![dir.path().to_path_buf(), dir.path().join("missing")];
    let result = DuplicateFinder::with_defaults().find_duplicates(&roots);

    match result {
        Err(FinderError::PathNotFound(path)) => assert!(path.ends_with("missing")),
        other => panic!("Expected PathNotFound, got {other:?}"),
    }
}

#[test]
fn test_include_unique_reports_all_files() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("a"), b"same").unwrap();
    fs::write(second.path().join("b"), b"same").unwrap();
    fs::write(second.path().join("c"), b"solo").unwrap();

    let config = FinderConfig::default().with_include_unique(true);
    let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(&roots)
        .unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(summary.duplicate_groups, 1);
    assert!(groups[0].has_duplicates());
    assert!(!groups[1].has_duplicates());
}
