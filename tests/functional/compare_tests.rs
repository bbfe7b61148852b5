//! End-to-end tests of the compare command

use crate::common::{assertions, sample_data, CliTestRunner};
use drivecurate::CurateError;
use std::fs;

#[test]
fn test_single_difference_is_exported() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let expected = fixture.create_csv("expected.csv", &sample_data::rhino_expected()).unwrap();
    let actual = fixture.create_csv("actual.csv", &sample_data::rhino_actual_one_change()).unwrap();
    let output_dir = fixture.output_dir();

    runner.expect_success(&[
        "compare",
        expected.to_str().unwrap(),
        actual.to_str().unwrap(),
        "--columns",
        "Parameter Name,V",
        "--output-dir",
        output_dir.to_str().unwrap(),
    ]);

    assert_eq!(fixture.output_files(), vec!["Differences in V.csv"]);

    let export = fixture.read_table(&output_dir.join("Differences in V.csv")).unwrap();
    assert_eq!(
        export.columns(),
        ["Port Number", "Parameter Number", "Parameter Name", "Expected Value", "Actual Value"]
    );
    assert_eq!(export.len(), 1);
    assert_eq!(assertions::column_text(&export, "Port Number"), vec!["1"]);
    assert_eq!(assertions::column_text(&export, "Parameter Number"), vec!["5"]);
    assert_eq!(assertions::column_text(&export, "Parameter Name"), vec!["X"]);
    assert_eq!(assertions::column_text(&export, "Expected Value"), vec!["10"]);
    assert_eq!(assertions::column_text(&export, "Actual Value"), vec!["20"]);
}

#[test]
fn test_identical_tables_write_nothing() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let expected = fixture.create_csv("expected.csv", &sample_data::rhino_expected()).unwrap();
    let actual = fixture.create_csv("actual.csv", &sample_data::rhino_expected()).unwrap();
    let output_dir = fixture.output_dir();

    runner.expect_success(&[
        "compare",
        expected.to_str().unwrap(),
        actual.to_str().unwrap(),
        "--columns",
        "Port Number,Parameter Number,Parameter Name,V",
        "--output-dir",
        output_dir.to_str().unwrap(),
    ]);

    assert!(fixture.output_files().is_empty());
}

#[test]
fn test_identical_report_says_so() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let expected = fixture.create_csv("expected.csv", &sample_data::rhino_expected()).unwrap();
    let report = fixture.root().join("report.txt");

    runner.expect_success(&[
        "compare",
        expected.to_str().unwrap(),
        expected.to_str().unwrap(),
        "--columns",
        "V",
        "--report",
        report.to_str().unwrap(),
    ]);

    let content = fs::read_to_string(&report).unwrap();
    assert!(content.contains("Generated: "));
    assert!(content.contains("No differences found: tables are identical in columns: V"));
}

#[test]
fn test_report_lists_differences_per_column() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let expected = fixture.create_csv("expected.csv", &sample_data::rhino_expected()).unwrap();
    let actual = fixture.create_csv("actual.csv", &sample_data::rhino_actual_one_change()).unwrap();
    let output_dir = fixture.output_dir();

    runner.expect_success(&[
        "compare",
        expected.to_str().unwrap(),
        actual.to_str().unwrap(),
        "--columns",
        "V",
        "--output-dir",
        output_dir.to_str().unwrap(),
        "--report",
        "report.txt",
    ]);

    let report = output_dir.join("report.txt");
    assertions::assert_file_exists_and_not_empty(&report);
    let content = fs::read_to_string(&report).unwrap();
    assert!(content.contains("Differences in V"));
    assert!(content.contains(&"*".repeat(100)));
    assert!(content.contains("Expected Value"));
}

#[test]
fn test_shape_mismatch_writes_no_output() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let expected = fixture.create_csv("expected.csv", &sample_data::rhino_expected()).unwrap();

    let mut longer = sample_data::rhino_expected();
    longer.push(vec!["3", "1", "W", "0"]);
    let actual = fixture.create_csv("actual.csv", &longer).unwrap();
    let output_dir = fixture.output_dir();
    let report = output_dir.join("report.txt");

    let err = runner.expect_failure(&[
        "compare",
        expected.to_str().unwrap(),
        actual.to_str().unwrap(),
        "--columns",
        "V",
        "--output-dir",
        output_dir.to_str().unwrap(),
        "--report",
        report.to_str().unwrap(),
    ]);

    assert!(matches!(
        err,
        CurateError::ShapeMismatch {
            source_rows: 3,
            target_rows: 4
        }
    ));
    assert!(!report.exists());
    assert!(fixture.output_files().is_empty());
}

#[test]
fn test_numeric_mode_ignores_float_formatting() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let expected = fixture
        .create_csv_raw("expected.csv", "Port Number,Parameter Number,Parameter Name,V\n1,1,A,1.0\n")
        .unwrap();
    let actual = fixture
        .create_csv_raw("actual.csv", "Port Number,Parameter Number,Parameter Name,V\n1,1,A,1\n")
        .unwrap();
    let output_dir = fixture.output_dir();

    runner.expect_success(&[
        "compare",
        expected.to_str().unwrap(),
        actual.to_str().unwrap(),
        "--columns",
        "V",
        "--numeric",
        "--output-dir",
        output_dir.to_str().unwrap(),
    ]);
    assert!(fixture.output_files().is_empty());

    runner.expect_success(&[
        "compare",
        expected.to_str().unwrap(),
        actual.to_str().unwrap(),
        "--columns",
        "V",
        "--output-dir",
        output_dir.to_str().unwrap(),
    ]);
    assert_eq!(fixture.output_files(), vec!["Differences in V.csv"]);
}

#[test]
fn test_default_columns_require_rhino_layout() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let expected = fixture.create_csv("expected.csv", &sample_data::rhino_expected()).unwrap();

    let err = runner.expect_failure(&[
        "compare",
        expected.to_str().unwrap(),
        expected.to_str().unwrap(),
        "--no-export",
    ]);
    match err {
        CurateError::MissingColumn { column, .. } => assert_eq!(column, "Parameter Max Value"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_format_is_rejected() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let expected = fixture.create_csv("expected.csv", &sample_data::rhino_expected()).unwrap();

    let err = runner.expect_failure(&[
        "compare",
        expected.to_str().unwrap(),
        expected.to_str().unwrap(),
        "--format",
        "xml",
    ]);
    assert!(matches!(err, CurateError::InvalidInput { .. }));
}

#[test]
fn test_compare_workbook_sheets() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let expected = fixture
        .create_workbook("drive.xlsx", &[("Params", sample_data::rhino_expected())])
        .unwrap();
    let actual = fixture
        .create_workbook("rhino.xlsx", &[("Params", sample_data::rhino_actual_one_change())])
        .unwrap();
    let output_dir = fixture.output_dir();

    runner.expect_success(&[
        "compare",
        expected.to_str().unwrap(),
        actual.to_str().unwrap(),
        "--sheet",
        "Params",
        "--columns",
        "V",
        "--output-dir",
        output_dir.to_str().unwrap(),
    ]);

    let export = fixture.read_table(&output_dir.join("Differences in V.csv")).unwrap();
    assert_eq!(assertions::column_text(&export, "Expected Value"), vec!["10"]);
    assert_eq!(assertions::column_text(&export, "Actual Value"), vec!["20"]);
    assert_eq!(assertions::column_text(&export, "Parameter Name"), vec!["X"]);
}

#[test]
fn test_csv_and_workbook_with_same_values_are_identical() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let rows = vec![
        vec!["Port Number", "Parameter Number", "Parameter Name", "V"],
        vec!["1", "5", "X", "10"],
        vec!["1", "6", "Y", "2.5"],
        vec!["2", "1", "Z", "-40"],
        vec!["2", "2", "W", "abc"],
    ];
    let csv = fixture.create_csv("drive.csv", &rows).unwrap();
    let workbook = fixture.create_workbook("rhino.xlsx", &[("Params", rows.clone())]).unwrap();
    let output_dir = fixture.output_dir();

    runner.expect_success(&[
        "compare",
        csv.to_str().unwrap(),
        workbook.to_str().unwrap(),
        "--sheet",
        "Params",
        "--columns",
        "Port Number,Parameter Number,Parameter Name,V",
        "--output-dir",
        output_dir.to_str().unwrap(),
    ]);

    assert!(fixture.output_files().is_empty());
}
