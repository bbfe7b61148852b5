//! Command-line interface for drivecurate

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "drivecurate")]
#[command(about = "Compare drive parameter tables and curate parameter databases")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare an expected parameter table against an actual one, row by row
    Compare {
        /// Expected table (CSV or workbook)
        expected: PathBuf,

        /// Actual table (CSV or workbook)
        actual: PathBuf,

        /// Sheet to read from workbook inputs (defaults to the first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Columns to compare, comma-separated (defaults to the Rhino parameter columns)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Treat cells that both parse as numbers as equal when numerically equal
        #[arg(long)]
        numeric: bool,

        /// Directory for per-column difference exports
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Also write the text report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Skip writing per-column difference exports
        #[arg(long)]
        no_export: bool,
    },

    /// Curate every configured section of a parameter database workbook
    Curate {
        /// Parameter database workbook
        workbook: PathBuf,

        /// Curation config file (defaults to the built-in PF6000T settings)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Release tables file (defaults to the built-in tables)
        #[arg(long)]
        tables: Option<PathBuf>,

        /// DHCF hardware configuration JSON used for derived values
        #[arg(long)]
        aux: Option<PathBuf>,

        /// Directory for curated section CSVs
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Remove previously generated CSV and text files from the output directory first
        #[arg(long)]
        clean: bool,

        /// Curate sections one after another instead of in parallel
        #[arg(long)]
        sequential: bool,
    },

    /// Show which commercial releases a drive revision excludes
    Exclusions {
        /// Drive family, e.g. PF6000T
        #[arg(long)]
        family: String,

        /// Firmware major revision
        #[arg(long)]
        major: u32,

        /// Firmware minor revision
        #[arg(long, default_value = "0")]
        minor: u32,

        /// Release tables file (defaults to the built-in tables)
        #[arg(long)]
        tables: Option<PathBuf>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Validate a curation config against the release tables
    Check {
        /// Curation config file (defaults to the built-in PF6000T settings)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Release tables file (defaults to the built-in tables)
        #[arg(long)]
        tables: Option<PathBuf>,
    },

    /// Write a default curation config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Config file to write
        #[arg(long, default_value = crate::config::DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },
}

/// Parse output format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Default log level for the `--verbose` flag
pub fn log_level(verbose: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}
