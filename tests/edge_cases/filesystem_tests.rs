//! Filesystem edge cases: missing inputs, unreadable files, nested outputs

use crate::common::{sample_data, CliTestRunner};
use drivecurate::{AuxConfig, CurateError, CurationConfig, ReleaseTables};
use std::fs;

#[test]
fn test_missing_input_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let present = fixture.create_csv("present.csv", &sample_data::rhino_expected()).unwrap();
    let missing = fixture.root().join("missing.csv");

    let err = runner.expect_failure(&[
        "compare",
        present.to_str().unwrap(),
        missing.to_str().unwrap(),
        "--columns",
        "V",
    ]);
    assert!(matches!(err, CurateError::InvalidInput { .. }));
}

#[test]
fn test_missing_workbook() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let missing = fixture.root().join("missing.xlsx");
    let output_dir = fixture.output_dir();

    let err = runner.expect_failure(&[
        "curate",
        missing.to_str().unwrap(),
        "--output-dir",
        output_dir.to_str().unwrap(),
    ]);
    assert!(matches!(err, CurateError::InvalidInput { .. }));
}

#[test]
fn test_corrupted_workbook() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let path = fixture.root().join("broken.xlsx");
    fs::write(&path, b"\x00\x01\x02\x03invalid_data\xff\xfe").unwrap();
    let output_dir = fixture.output_dir();

    let err = runner.expect_failure(&[
        "curate",
        path.to_str().unwrap(),
        "--output-dir",
        output_dir.to_str().unwrap(),
    ]);
    assert!(matches!(err, CurateError::Workbook(_)));
}

#[test]
fn test_invalid_config_files_carry_their_path() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let config = fixture.create_csv_raw("bad.json", "{ not json").unwrap();

    let err = CurationConfig::load(&config).unwrap_err();
    assert!(err.to_string().contains("bad.json"));

    let err = ReleaseTables::load(&fixture.root().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("absent.json"));

    let aux = fixture.create_csv_raw("aux.json", "[1, 2]").unwrap();
    assert!(AuxConfig::load(&aux).is_err());
}

#[test]
fn test_exports_go_to_nested_output_dir() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let expected = fixture.create_csv("expected.csv", &sample_data::rhino_expected()).unwrap();
    let actual = fixture.create_csv("actual.csv", &sample_data::rhino_actual_one_change()).unwrap();
    let nested = fixture.root().join("reports/2024/drive");

    runner.expect_success(&[
        "compare",
        expected.to_str().unwrap(),
        actual.to_str().unwrap(),
        "--columns",
        "V",
        "--output-dir",
        nested.to_str().unwrap(),
    ]);

    assert!(nested.join("Differences in V.csv").exists());
}
