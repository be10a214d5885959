use chunkdupe::cli::Cli;
use chunkdupe::config::{Config, ConfigError};
use chunkdupe::error::ExitCode;
use chunkdupe::hasher::HashAlgorithm;
use clap::Parser;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_load_explicit_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chunkdupe.toml");
    fs::write(
        &path,
        "chunk_size = 4096\nhash = \"multiplicative\"\nskip_hidden = true\n",
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.chunk_size, 4096);
    assert_eq!(config.hash, HashAlgorithm::Multiplicative);
    assert!(config.skip_hidden);
    assert!(!config.recursive);
}

#[test]
fn test_load_rejects_malformed_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "chunk_size = [not toml").unwrap();

    assert!(matches!(
        Config::load(Some(&path)),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_run_app_uses_config_file() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let sub = data.join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(data.join("a"), b"same bytes").unwrap();
    fs::write(sub.join("b"), b"same bytes").unwrap();

    // An empty file keeps the user's own config out of the baseline run
    let empty_config = dir.path().join("empty.toml");
    fs::write(&empty_config, "").unwrap();

    // Without recursion the copy in sub/ is not seen
    let cli = Cli::try_parse_from([
        "chunkdupe",
        "-q",
        "--config",
        empty_config.to_str().unwrap(),
        "scan",
        data.to_str().unwrap(),
        "-o",
        "json",
    ])
    .unwrap();
    assert_eq!(chunkdupe::run_app(cli).unwrap(), ExitCode::NoDuplicates);

    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "recursive = true\n").unwrap();

    let cli = Cli::try_parse_from([
        "chunkdupe",
        "-q",
        "--config",
        config_path.to_str().unwrap(),
        "scan",
        data.to_str().unwrap(),
        "-o",
        "json",
    ])
    .unwrap();
    assert_eq!(chunkdupe::run_app(cli).unwrap(), ExitCode::Success);
}

#[test]
fn test_run_app_missing_directory_is_error() {
    let cli = Cli::try_parse_from([
        "chunkdupe",
        "-q",
        "scan",
        "/nonexistent/chunkdupe/root",
        "-o",
        "csv",
    ])
    .unwrap();

    let err = chunkdupe::run_app(cli).unwrap_err();
    assert!(err.to_string().contains("Path not found"));
}

#[test]
fn test_run_app_missing_config_is_error() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from([
        "chunkdupe",
        "-q",
        "--config",
        "/nonexistent/chunkdupe.toml",
        "scan",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();

    let err = chunkdupe::run_app(cli).unwrap_err();
    assert!(format!("{err:#}").contains("Config file not found"));
}
