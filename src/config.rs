//! Run configuration, static release tables, and the auxiliary DHCF source

use crate::derive::RatedConstants;
use crate::error::{CurateError, Result};
use crate::filter::BLANK_MARKERS;
use crate::revision::{DriveTarget, RevisionEntry, RevisionPolicy};
use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Release priorities and revision exclusions shipped with the tool
pub const BUILTIN_RELEASE_TABLES: &str = include_str!("../data/release_tables.json");

/// Default config file name used by `init`
pub const DEFAULT_CONFIG_FILE: &str = "curation.json";

/// Section-specific pattern exclusion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPattern {
    pub section: String,
    pub column: String,
    pub pattern: String,
}

/// Where and with which ratings values are derived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationConfig {
    pub section: String,
    pub rated: RatedConstants,
}

/// Everything a curation run needs besides the release tables.
///
/// Built once at the command boundary and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    pub target: DriveTarget,
    pub sheets: Vec<String>,
    pub columns: Vec<String>,
    pub key_column: String,
    pub release_column: String,
    pub parameter_number_column: String,
    pub applicability_column: String,
    pub applicability_values_to_skip: Vec<String>,
    pub names_to_skip: Vec<String>,
    pub section_patterns: Vec<SectionPattern>,
    pub derivation: Option<DerivationConfig>,
    /// Fail instead of excluding nothing when the target revision is unmapped
    pub strict_revision: bool,
}

impl Default for CurationConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            target: DriveTarget::new("PF6000T", 1, 1),
            sheets: strings(&[
                "Port 0 ICB Parameters",
                "Port 9 Application Parameters",
                "Port 13 Converter Control Param",
                "Port 12 PCCB Parameters",
                "Port 14 PIOB Parameters",
            ]),
            columns: strings(&[
                "Name",
                "New Parameter Number",
                "Commercial Release",
                "Offline Minimum",
                "Offline Maximum",
                "Offline Default",
                "Online Minimum",
                "Online Maximum",
                "Online Default",
                "Applicable to PF6000T?",
            ]),
            key_column: "Name".to_string(),
            release_column: "Commercial Release".to_string(),
            parameter_number_column: "New Parameter Number".to_string(),
            applicability_column: "Applicable to PF6000T?".to_string(),
            applicability_values_to_skip: strings(&["No", ""]),
            names_to_skip: strings(&["Reserved"]),
            section_patterns: vec![
                SectionPattern {
                    section: "Port 12 PCCB Parameters".to_string(),
                    column: "Name".to_string(),
                    pattern: (1..=9)
                        .map(|n| format!("U{n}|W{n}|V{n}"))
                        .collect::<Vec<_>>()
                        .join("|"),
                },
                SectionPattern {
                    section: "Port 14 PIOB Parameters".to_string(),
                    column: "New Parameter Number".to_string(),
                    pattern: "TBD".to_string(),
                },
            ],
            derivation: None,
            strict_revision: false,
        }
    }
}

impl CurationConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON; an existing file is kept unless `force`
    pub fn save(&self, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(CurateError::config(format!(
                "{} already exists, use --force to overwrite",
                path.display()
            )));
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Structural checks that do not need the release tables
    pub fn validate(&self) -> Result<()> {
        if self.sheets.is_empty() {
            return Err(CurateError::config("No sheets configured"));
        }

        for column in [
            &self.key_column,
            &self.release_column,
            &self.parameter_number_column,
            &self.applicability_column,
        ] {
            if !self.columns.contains(column) {
                return Err(CurateError::config(format!(
                    "Column '{}' is used by a rule but not imported",
                    column
                )));
            }
        }

        for rule in &self.section_patterns {
            if !self.columns.contains(&rule.column) {
                return Err(CurateError::config(format!(
                    "Pattern for section '{}' targets unknown column '{}'",
                    rule.section, rule.column
                )));
            }
        }

        if let Some(derivation) = &self.derivation {
            derivation.rated.validate()?;
        }

        Ok(())
    }

    /// Pattern rules for one section, in configured order
    pub fn patterns_for<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a SectionPattern> + 'a {
        self.section_patterns.iter().filter(move |p| p.section == section)
    }

    /// Derivation settings when `section` is the derivation section
    pub fn derivation_for(&self, section: &str) -> Option<&DerivationConfig> {
        self.derivation.as_ref().filter(|d| d.section == section)
    }
}

/// Versioned release data: priorities and per-revision exclusions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseTables {
    pub release_priorities: IndexMap<String, i64>,
    pub revision_exclusions: Vec<RevisionEntry>,
}

impl ReleaseTables {
    /// Tables embedded in the binary
    pub fn builtin() -> Result<Self> {
        Ok(serde_json::from_str(BUILTIN_RELEASE_TABLES)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read release tables {}", path.display()))?;
        let tables = serde_json::from_str(&content)
            .with_context(|| format!("Invalid release tables {}", path.display()))?;
        Ok(tables)
    }

    /// Load from `path` when given, otherwise the builtin tables
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn policy(&self) -> RevisionPolicy {
        RevisionPolicy::new(self.revision_exclusions.clone())
    }

    /// Problems that would make a run misbehave, empty when consistent
    pub fn validate(&self, target: &DriveTarget) -> Vec<String> {
        let mut issues = Vec::new();
        let policy = self.policy();

        if !policy.is_mapped(target) {
            issues.push(format!(
                "No exclusion entry for {}: every release would be kept",
                target
            ));
        }

        for release in policy.referenced_releases() {
            if !BLANK_MARKERS.contains(&release) && !self.release_priorities.contains_key(release) {
                issues.push(format!("Release '{}' is excluded somewhere but has no priority", release));
            }
        }

        issues
    }
}

/// DHCF hardware configuration: field name to value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuxConfig {
    entries: IndexMap<String, String>,
}

impl AuxConfig {
    /// Load a flat JSON object; scalar values are kept as their text
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read auxiliary config {}", path.display()))?;
        let raw: IndexMap<String, serde_json::Value> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid auxiliary config {}", path.display()))?;

        let mut entries = IndexMap::with_capacity(raw.len());
        for (key, value) in raw {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(CurateError::invalid_config_value(key, other.to_string()));
                }
            };
            entries.insert(key, text);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AuxConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
