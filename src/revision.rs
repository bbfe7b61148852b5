//! Firmware-revision driven release exclusion lookup

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Drive family and firmware revision a curated table is built for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriveTarget {
    pub family: String,
    pub major: u32,
    pub minor: u32,
}

impl DriveTarget {
    pub fn new(family: impl Into<String>, major: u32, minor: u32) -> Self {
        Self {
            family: family.into(),
            major,
            minor,
        }
    }
}

impl fmt::Display for DriveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.family, self.major, self.minor)
    }
}

/// One row of the exclusion table.
///
/// `family` and `minor` are wildcards when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    pub major: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor: Option<u32>,
    pub exclude: Vec<String>,
}

impl RevisionEntry {
    fn matches(&self, family: &str, major: u32, minor: u32) -> bool {
        self.major == major
            && self.minor.map_or(true, |m| m == minor)
            && self.family.as_deref().map_or(true, |f| f == family)
    }

    fn specificity(&self) -> u8 {
        u8::from(self.family.is_some()) * 2 + u8::from(self.minor.is_some())
    }
}

/// Lookup from drive target to the commercial releases it must not carry
#[derive(Debug, Clone, Default)]
pub struct RevisionPolicy {
    entries: Vec<RevisionEntry>,
}

impl RevisionPolicy {
    pub fn new(entries: Vec<RevisionEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RevisionEntry] {
        &self.entries
    }

    /// Most specific matching entry's exclusions, or `None` when nothing matches.
    ///
    /// Family-specific entries beat family-agnostic ones, then minor-specific
    /// beats minor-agnostic. Among equals the first entry wins.
    pub fn resolve(&self, family: &str, major: u32, minor: u32) -> Option<IndexSet<String>> {
        let mut best: Option<&RevisionEntry> = None;
        for entry in self.entries.iter().filter(|e| e.matches(family, major, minor)) {
            if best.map_or(true, |b| entry.specificity() > b.specificity()) {
                best = Some(entry);
            }
        }
        best.map(|entry| entry.exclude.iter().cloned().collect())
    }

    /// Releases to exclude; an unmapped revision excludes nothing
    pub fn exclusions_for(&self, family: &str, major: u32, minor: u32) -> IndexSet<String> {
        self.resolve(family, major, minor).unwrap_or_default()
    }

    pub fn is_mapped(&self, target: &DriveTarget) -> bool {
        self.resolve(&target.family, target.major, target.minor).is_some()
    }

    /// Every release named anywhere in the table
    pub fn referenced_releases(&self) -> IndexSet<&str> {
        self.entries
            .iter()
            .flat_map(|e| e.exclude.iter().map(String::as_str))
            .collect()
    }
}
