//! Edge cases in loaded and written data

use crate::common::{assertions::column_text, TestFixture};
use drivecurate::data::{load_table, DataProcessor, WorkbookReader};
use drivecurate::{CurateError, Table, Value};

#[test]
fn test_empty_fields_load_as_missing() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("blank.csv", "Name,Status\nA,\n,Active\n").unwrap();

    let table = load_table(&path, None, None).unwrap();
    assert_eq!(table.value(0, "Status"), None);
    assert_eq!(table.value(1, "Name"), None);
    assert_eq!(column_text(&table, "Status"), vec!["nan", "Active"]);
}

#[test]
fn test_numbers_keep_their_text() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("numbers.csv", "V\n1.0\n1\n007\n").unwrap();

    let table = load_table(&path, None, None).unwrap();
    assert_eq!(column_text(&table, "V"), vec!["1.0", "1", "007"]);
}

#[test]
fn test_header_only_csv() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("header.csv", "Name,Status\n").unwrap();

    let table = load_table(&path, None, None).unwrap();
    assert_eq!(table.columns(), ["Name", "Status"]);
    assert!(table.is_empty());
}

#[test]
fn test_quoted_commas_and_unicode_survive_a_write() {
    let fixture = TestFixture::new().unwrap();
    let mut table = Table::new("t", ["Parameter Name", "Unit"]);
    table.push_row([Some(Value::text("Speed, Max")), Some(Value::text("°C"))]);
    table.push_row([Some(Value::text("Ström \"A\"")), None]);

    let path = fixture.root().join("written.csv");
    let processor = DataProcessor::new().unwrap();
    processor.write_csv(&table, &path).unwrap();

    let reloaded = processor.load_csv(&path, None).unwrap();
    assert_eq!(column_text(&reloaded, "Parameter Name"), vec!["Speed, Max", "Ström \"A\""]);
    assert_eq!(column_text(&reloaded, "Unit"), vec!["°C", "nan"]);
}

#[test]
fn test_writer_overwrites_existing_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.create_csv_raw("out.csv", "Old\nvalue\nvalue\n").unwrap();

    let mut table = Table::new("t", ["New"]);
    table.push_row([Some(Value::Int(1))]);
    DataProcessor::new().unwrap().write_csv(&table, &path).unwrap();

    let reloaded = load_table(&path, None, None).unwrap();
    assert_eq!(reloaded.columns(), ["New"]);
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn test_writer_rejects_table_without_columns() {
    let fixture = TestFixture::new().unwrap();
    let table = Table::new("empty", Vec::<String>::new());
    let err = DataProcessor::new()
        .unwrap()
        .write_csv(&table, &fixture.root().join("none.csv"))
        .unwrap_err();
    assert!(matches!(err, CurateError::InvalidInput { .. }));
}

#[test]
fn test_workbook_sheets_and_blank_rows() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_workbook(
            "book.xlsx",
            &[
                ("First", vec![vec!["Name", "V"], vec!["A", "1"], vec!["", ""], vec!["B", "2.5"]]),
                ("Second", vec![vec!["Other"], vec!["x"]]),
            ],
        )
        .unwrap();

    let mut reader = WorkbookReader::open(&path).unwrap();
    assert_eq!(reader.sheet_names(), vec!["First", "Second"]);

    let first = reader.load_sheet("First", None).unwrap();
    assert_eq!(first.name(), "First");
    assert_eq!(column_text(&first, "Name"), vec!["A", "B"]);
    assert_eq!(first.value(0, "V"), Some(&Value::Int(1)));
    assert_eq!(first.value(1, "V"), Some(&Value::Float(2.5)));

    // No sheet name means the first sheet
    let default = load_table(&path, None, None).unwrap();
    assert_eq!(default.name(), "First");

    let err = reader.load_sheet("Third", None).unwrap_err();
    assert!(matches!(err, CurateError::SheetNotFound { .. }));
}

#[test]
fn test_workbook_allow_list_missing_column() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .create_workbook("book.xlsx", &[("Params", vec![vec!["Name"], vec!["A"]])])
        .unwrap();

    let allow = vec!["Name".to_string(), "Commercial Release".to_string()];
    let err = load_table(&path, Some("Params"), Some(&allow)).unwrap_err();
    match err {
        CurateError::MissingColumn { column, .. } => assert_eq!(column, "Commercial Release"),
        other => panic!("unexpected error: {other}"),
    }
}
