use chunkdupe::duplicates::{DuplicateFinder, DuplicateGroup, ScanSummary};
use chunkdupe::error::ExitCode;
use chunkdupe::output::{CsvOutput, JsonOutput, TextOutput};
use std::fs;
use tempfile::{tempdir, TempDir};

fn scan_fixture() -> (TempDir, Vec<DuplicateGroup>, ScanSummary) {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"exported").unwrap();
    fs::write(dir.path().join("b.txt"), b"exported").unwrap();
    fs::write(dir.path().join("c.txt"), b"distinct").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();
    (dir, groups, summary)
}

#[test]
fn test_json_export_of_real_scan() {
    let (_dir, groups, summary) = scan_fixture();
    let exit_code = ExitCode::from_duplicate_groups(summary.duplicate_groups);

    let json = JsonOutput::new(&groups, &summary, exit_code)
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["duplicates"].as_array().unwrap().len(), 1);
    assert_eq!(value["duplicates"][0]["size"], 8);
    assert_eq!(value["summary"]["total_files"], 3);
    assert_eq!(value["summary"]["exit_code_name"], "CD000");

    let files = value["duplicates"][0]["files"].as_array().unwrap();
    assert!(files.iter().all(|f| f.as_str().unwrap().ends_with(".txt")));
}

#[test]
fn test_csv_export_of_real_scan() {
    let (_dir, groups, _) = scan_fixture();

    let csv = CsvOutput::new(&groups).to_string().unwrap();
    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(&row[0], "1");
        assert_eq!(&row[1], "2");
        assert_eq!(&row[3], "8");
    }
}

#[test]
fn test_text_export_of_real_scan() {
    let (_dir, groups, summary) = scan_fixture();

    let text = TextOutput::new(&groups, &summary).to_string().unwrap();
    assert!(text.contains("a.txt"));
    assert!(text.contains("b.txt"));
    assert!(!text.contains("c.txt"));
    assert!(text.contains("Files compared:   3"));
}
