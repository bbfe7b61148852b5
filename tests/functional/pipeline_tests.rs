//! Library-level scenarios across comparison, filtering and curation

use drivecurate::compare::compare;
use drivecurate::dedupe::Deduplicator;
use drivecurate::filter::{exclude_by_pattern, exclude_by_values};
use drivecurate::report::ReportFormatter;
use drivecurate::table::cell_text;
use drivecurate::{AuxConfig, CurateError, CurationConfig, CurationPipeline, ReleaseTables, Table, Value};
use indexmap::IndexMap;

fn parameters(values: &[&str]) -> Table {
    let mut table = Table::new("params", ["Port Number", "Parameter Number", "Parameter Name", "V"]);
    for (i, value) in values.iter().enumerate() {
        table.push_row([
            Some(Value::Int(1)),
            Some(Value::Int(5 + i as i64)),
            Some(Value::text(format!("P{}", i))),
            Some(Value::text(*value)),
        ]);
    }
    table
}

#[test]
fn test_comparison_flags_match_canonical_inequality() {
    let source = parameters(&["10", "1.0", "x"]);
    let target = parameters(&["10", "1", "y"]);
    let columns = vec!["Parameter Name".to_string(), "V".to_string()];

    let result = compare(&source, &target, &columns).unwrap();
    assert_eq!(result.row_count(), 3);
    assert_eq!(result.column_flags("Parameter Name"), Some(&[false, false, false][..]));
    assert_eq!(result.column_flags("V"), Some(&[false, true, true][..]));

    let flags = result.to_table();
    assert_eq!(flags.columns(), ["Parameter Name", "V"]);
    assert_eq!(flags.len(), 3);
}

#[test]
fn test_report_and_exports_agree() {
    let source = parameters(&["10", "1.0", "x"]);
    let target = parameters(&["20", "1.0", "y"]);
    let columns = vec!["V".to_string()];
    let comparison = compare(&source, &target, &columns).unwrap();

    let formatter = ReportFormatter::default();
    let report = formatter.format(&source, &target, &comparison).unwrap();
    let exports = formatter.export_per_column(&source, &target, &comparison).unwrap();

    assert_eq!(report.difference_count(), 2);
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].0, "Differences in V");
    assert_eq!(exports[0].1.len(), report.difference_count());
}

#[test]
fn test_identical_tables_have_no_exports() {
    let source = parameters(&["10", "20"]);
    let columns = vec!["V".to_string()];
    let comparison = compare(&source, &source, &columns).unwrap();

    let formatter = ReportFormatter::default();
    assert!(formatter.format(&source, &source, &comparison).unwrap().is_identical());
    assert!(formatter.export_per_column(&source, &source, &comparison).unwrap().is_empty());
}

#[test]
fn test_status_exclusion_scenario() {
    let mut table = Table::new("t", ["Status"]);
    for status in [Some("Reserved"), None, Some("Active")] {
        table.push_row([status.map(Value::text)]);
    }

    let kept = exclude_by_values(&table, "Status", &["", "Reserved"]).unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept.value(0, "Status"), Some(&Value::text("Active")));
}

#[test]
fn test_pattern_exclusion_keeps_missing_names() {
    let mut table = Table::new("t", ["Name"]);
    for name in [Some("Cell V3 Status"), None, Some("Cell Count")] {
        table.push_row([name.map(Value::text)]);
    }

    let kept = exclude_by_pattern(&table, "Name", "V3|U3").unwrap();
    assert_eq!(kept.len(), 2);
    assert_eq!(kept.value(0, "Name"), None);

    assert!(matches!(
        exclude_by_pattern(&table, "Name", "(unclosed"),
        Err(CurateError::InvalidPattern { .. })
    ));
}

#[test]
fn test_dedupe_scenario_prefers_lower_rank() {
    let priorities: IndexMap<String, i64> = [("CR1".to_string(), 18), ("CR2".to_string(), 13)].into_iter().collect();
    let mut table = Table::new("t", ["Name", "Commercial Release", "New Parameter Number"]);
    table.push_row([Some(Value::text("A")), Some(Value::text("CR1")), Some(Value::Int(1))]);
    table.push_row([Some(Value::text("A")), Some(Value::text("CR2")), Some(Value::Int(1))]);

    let deduplicator = Deduplicator {
        key_column: "Name",
        priority_column: "Commercial Release",
        display_order_column: "New Parameter Number",
        priorities: &priorities,
    };
    let result = deduplicator.dedupe(&table).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(cell_text(result.value(0, "Commercial Release")), "CR2");
}

#[test]
fn test_pipeline_is_reusable_across_sections() {
    let config = CurationConfig::default();
    let tables = ReleaseTables::builtin().unwrap();
    let aux = AuxConfig::default();
    let pipeline = CurationPipeline::new(&config, &tables, &aux).unwrap();

    let mut raw = Table::new("raw", config.columns.iter().cloned());
    let row = |name: &str, number: &str| {
        let mut cells = vec![None; config.columns.len()];
        cells[0] = Some(Value::text(name));
        cells[1] = Some(Value::text(number));
        cells[2] = Some(Value::text("CR1"));
        cells[9] = Some(Value::text("Yes"));
        cells
    };
    raw.push_row(row("Output Status", "TBD"));
    raw.push_row(row("Input Status", "7"));

    // Only the PIOB section filters placeholder numbers
    let piob = pipeline.curate("Port 14 PIOB Parameters", &raw).unwrap();
    assert_eq!(piob.table.len(), 1);
    assert_eq!(piob.table.value(0, "New Parameter Number"), Some(&Value::Int(7)));

    let icb = pipeline.curate("Port 0 ICB Parameters", &raw);
    assert!(matches!(icb, Err(CurateError::InvalidNumber { .. })));
}
