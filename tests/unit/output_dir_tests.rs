//! Unit tests for output directory handling

use crate::common::TestFixture;
use drivecurate::workspace::OutputDir;
use std::fs;
use std::path::Path;

#[test]
fn test_create_nested_output_dir() {
    let fixture = TestFixture::new().unwrap();
    let output = OutputDir::create(fixture.root().join("a/b/c")).unwrap();
    assert!(output.root.is_dir());
    assert!(output.artifacts(&[]).unwrap().is_empty());
}

#[test]
fn test_artifacts_are_sorted_and_top_level_only() {
    let fixture = TestFixture::new().unwrap();
    let output = OutputDir::create(fixture.output_dir()).unwrap();
    let sections = vec!["Port 0 ICB Parameters".to_string()];

    fs::write(output.root.join("Differences in V.csv"), "x\n").unwrap();
    fs::write(output.root.join("Differences in Parameter Name.CSV"), "x\n").unwrap();
    fs::write(output.root.join("Port 0 ICB Parameters.csv"), "x\n").unwrap();
    fs::write(output.root.join("Parameter_database_English.csv"), "x\n").unwrap();
    fs::write(output.root.join("report.txt"), "x").unwrap();
    fs::create_dir(output.root.join("archive")).unwrap();
    fs::write(output.root.join("archive/Differences in V.csv"), "x\n").unwrap();

    let names: Vec<String> = output
        .artifacts(&sections)
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "Differences in Parameter Name.CSV",
            "Differences in V.csv",
            "Port 0 ICB Parameters.csv"
        ]
    );
}

#[test]
fn test_clean_reports_bytes() {
    let fixture = TestFixture::new().unwrap();
    let output = OutputDir::create(fixture.output_dir()).unwrap();
    let sections = vec!["Port 0 ICB Parameters".to_string()];
    fs::write(output.root.join("Port 0 ICB Parameters.csv"), "0123456789").unwrap();

    let stats = output.clean(&sections).unwrap();
    assert_eq!(stats.files_removed, 1);
    assert_eq!(stats.bytes_freed, 10);

    let again = output.clean(&sections).unwrap();
    assert_eq!(again.files_removed, 0);
}

#[test]
fn test_clean_in_current_directory_keeps_user_inputs() {
    let fixture = TestFixture::new().unwrap();
    let output = OutputDir::create(fixture.root()).unwrap();
    let input = fixture.create_csv_raw("Parameter_database_English.csv", "Name\nA\n").unwrap();
    let notes = fixture.create_csv_raw("notes.txt", "keep").unwrap();

    let stats = output.clean(&["Port 0 ICB Parameters".to_string()]).unwrap();
    assert_eq!(stats.files_removed, 0);
    assert!(input.exists());
    assert!(notes.exists());
}

#[test]
fn test_report_path_keeps_absolute_paths() {
    let fixture = TestFixture::new().unwrap();
    let output = OutputDir::create(fixture.output_dir()).unwrap();

    let absolute = fixture.root().join("report.txt");
    assert_eq!(output.report_path(&absolute), absolute);
    assert_eq!(
        output.report_path(Path::new("report.txt")),
        fixture.output_dir().join("report.txt")
    );
}
