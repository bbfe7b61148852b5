//! Per-section curation: exclusions, deduplication, derivation, normalization

use crate::config::{AuxConfig, CurationConfig, ReleaseTables};
use crate::dedupe::Deduplicator;
use crate::derive::ValueDeriver;
use crate::error::{CurateError, Result};
use crate::filter::{exclude_by_pattern, exclude_by_values};
use crate::table::{Table, Value};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Row counts around one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: String,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl StageCount {
    pub fn removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// What happened to one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurationSummary {
    pub section: String,
    pub stages: Vec<StageCount>,
}

impl CurationSummary {
    fn new(section: &str) -> Self {
        Self {
            section: section.to_string(),
            stages: Vec::new(),
        }
    }

    fn record(&mut self, stage: impl Into<String>, before: &Table, after: &Table) {
        self.stages.push(StageCount {
            stage: stage.into(),
            rows_before: before.len(),
            rows_after: after.len(),
        });
    }

    pub fn input_rows(&self) -> usize {
        self.stages.first().map_or(0, |s| s.rows_before)
    }

    pub fn output_rows(&self) -> usize {
        self.stages.last().map_or(0, |s| s.rows_after)
    }
}

/// Curated table plus its stage summary
#[derive(Debug, Clone)]
pub struct CuratedSection {
    pub table: Table,
    pub summary: CurationSummary,
}

/// Fixed-order curation over one section at a time.
///
/// The revision lookup is resolved once at construction; every section is
/// curated independently from the same immutable inputs.
#[derive(Debug)]
pub struct CurationPipeline<'a> {
    config: &'a CurationConfig,
    priorities: &'a IndexMap<String, i64>,
    aux: &'a AuxConfig,
    exclusions: IndexSet<String>,
    revision_mapped: bool,
}

impl<'a> CurationPipeline<'a> {
    /// Resolve the release exclusions for the configured target.
    ///
    /// An unmapped revision excludes nothing, unless `strict_revision` is set.
    pub fn new(config: &'a CurationConfig, tables: &'a ReleaseTables, aux: &'a AuxConfig) -> Result<Self> {
        if let Some(derivation) = &config.derivation {
            derivation.rated.validate()?;
        }

        let target = &config.target;
        let resolved = tables
            .policy()
            .resolve(&target.family, target.major, target.minor);

        if resolved.is_none() && config.strict_revision {
            return Err(CurateError::UnmappedRevision {
                family: target.family.clone(),
                major: target.major,
                minor: target.minor,
            });
        }

        Ok(Self {
            config,
            priorities: &tables.release_priorities,
            aux,
            revision_mapped: resolved.is_some(),
            exclusions: resolved.unwrap_or_default(),
        })
    }

    pub fn revision_mapped(&self) -> bool {
        self.revision_mapped
    }

    pub fn exclusions(&self) -> &IndexSet<String> {
        &self.exclusions
    }

    /// Run every stage over one section's raw table
    pub fn curate(&self, section: &str, raw: &Table) -> Result<CuratedSection> {
        let config = self.config;
        let mut summary = CurationSummary::new(section);
        let mut table = raw.clone();

        for rule in config.patterns_for(section) {
            let next = exclude_by_pattern(&table, &rule.column, &rule.pattern)?;
            summary.record(format!("pattern on {}", rule.column), &table, &next);
            table = next;
        }

        let exclusions: Vec<&str> = self.exclusions.iter().map(String::as_str).collect();
        let next = exclude_by_values(&table, &config.release_column, &exclusions)?;
        summary.record("release exclusions", &table, &next);
        table = next;

        let next = exclude_by_values(
            &table,
            &config.applicability_column,
            &config.applicability_values_to_skip,
        )?;
        summary.record("applicability", &table, &next);
        table = next;

        let next = exclude_by_values(&table, &config.key_column, &config.names_to_skip)?;
        summary.record("placeholder names", &table, &next);
        table = next;

        let deduplicator = Deduplicator {
            key_column: &config.key_column,
            priority_column: &config.release_column,
            display_order_column: &config.parameter_number_column,
            priorities: self.priorities,
        };
        let next = deduplicator.dedupe(&table)?;
        summary.record("deduplication", &table, &next);
        table = next;

        if let Some(derivation) = config.derivation_for(section) {
            let deriver = ValueDeriver {
                name_column: &config.key_column,
                release_column: &config.release_column,
                family: &config.target.family,
                rated: &derivation.rated,
                aux: self.aux,
            };
            let next = deriver.derive(&table)?;
            summary.record("derivation", &table, &next);
            table = next;
        }

        let next = normalize_integer_column(&table, &config.parameter_number_column)?;
        summary.record("normalization", &table, &next);

        Ok(CuratedSection {
            table: next,
            summary,
        })
    }
}

/// Rewrite `column` as integers, truncating fractional values.
///
/// Missing or non-numeric cells fail with `InvalidNumber`.
pub fn normalize_integer_column(table: &Table, column: &str) -> Result<Table> {
    table.require_column(column)?;

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let cell = row.get(column).and_then(Option::as_ref);
            let number = cell
                .and_then(as_integer)
                .ok_or_else(|| CurateError::invalid_number(column, crate::table::cell_text(cell)))?;

            let mut updated = row.clone();
            updated.insert(column.to_string(), Some(Value::Int(number)));
            Ok(updated)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(table.with_rows(rows))
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| value.as_f64().map(|f| f.trunc() as i64)),
        _ => value.as_f64().map(|f| f.trunc() as i64),
    }
}
