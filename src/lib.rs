//! # drivecurate
//!
//! Comparison and curation of drive parameter databases: cell-by-cell
//! difference reports between parameter tables, and revision-aware
//! filtering, deduplication and value derivation of database sections.

pub mod cli;
pub mod error;
pub mod table;
pub mod compare;
pub mod report;
pub mod filter;
pub mod revision;
pub mod dedupe;
pub mod derive;
pub mod config;
pub mod curation;
pub mod data;
pub mod workspace;
pub mod commands;
pub mod output;
pub mod progress;

pub use compare::{ComparisonMode, ComparisonResult, DifferenceEngine};
pub use config::{AuxConfig, CurationConfig, ReleaseTables};
pub use curation::{CuratedSection, CurationPipeline};
pub use error::{CurateError, Result};
pub use report::{Report, ReportFormatter};
pub use revision::{DriveTarget, RevisionPolicy};
pub use table::{Table, Value};
