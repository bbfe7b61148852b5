//! Output formatting utilities

use crate::curation::CurationSummary;
use crate::error::Result;
use crate::report::Report;
use crate::revision::DriveTarget;
use crate::workspace::CleanupStats;
use indexmap::IndexSet;
use std::path::PathBuf;

/// Pretty printer for terminal output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print a difference report followed by a short tally
    pub fn print_report(report: &Report) {
        print!("{}", report.render_text());

        if report.is_identical() {
            println!("✅ Tables match in {} column(s)", report.compared_columns.len());
        } else {
            println!();
            println!(
                "❌ {} difference(s) in {} of {} column(s)",
                report.difference_count(),
                report.sections.len(),
                report.compared_columns.len()
            );
        }
    }

    /// Print files written by a command
    pub fn print_written(paths: &[PathBuf]) {
        if paths.is_empty() {
            return;
        }

        println!("📁 Written:");
        for (i, path) in paths.iter().enumerate() {
            let prefix = if i == paths.len() - 1 { "└─" } else { "├─" };
            println!("{} {}", prefix, path.display());
        }
    }

    /// Print per-section stage counts of a curation run
    pub fn print_curation_summaries(target: &DriveTarget, summaries: &[CurationSummary]) {
        println!("🔧 Curated {} section(s) for {}", summaries.len(), target);

        for (i, summary) in summaries.iter().enumerate() {
            let last = i == summaries.len() - 1;
            let (prefix, indent) = if last { ("└─", "   ") } else { ("├─", "│  ") };
            println!(
                "{} {}: {} → {} rows",
                prefix,
                summary.section,
                summary.input_rows(),
                summary.output_rows()
            );

            let removing: Vec<_> = summary.stages.iter().filter(|s| s.removed() > 0).collect();
            for (j, stage) in removing.iter().enumerate() {
                let marker = if j == removing.len() - 1 { "└─" } else { "├─" };
                println!("{}{} {}: -{}", indent, marker, stage.stage, stage.removed());
            }
        }
    }

    /// Print the resolved exclusion set for a target
    pub fn print_exclusions(target: &DriveTarget, exclusions: Option<&IndexSet<String>>) {
        match exclusions {
            None => {
                println!("⚠️  {} is not mapped: no releases would be excluded", target);
            }
            Some(set) if set.is_empty() => {
                println!("📋 {}: no releases excluded", target);
            }
            Some(set) => {
                println!("📋 Releases excluded for {}:", target);
                for (i, release) in set.iter().enumerate() {
                    let prefix = if i == set.len() - 1 { "└─" } else { "├─" };
                    let shown = if release.is_empty() { "(blank)" } else { release.as_str() };
                    println!("{} {}", prefix, shown);
                }
            }
        }
    }

    /// Print configuration check results
    pub fn print_check_results(target: &DriveTarget, issues: &[String]) {
        if issues.is_empty() {
            println!("✅ Configuration for {} is consistent", target);
            return;
        }

        println!("❌ {} issue(s) found for {}:", issues.len(), target);
        for (i, issue) in issues.iter().enumerate() {
            let prefix = if i == issues.len() - 1 { "└─" } else { "├─" };
            println!("{} {}", prefix, issue);
        }
    }

    pub fn print_cleanup(stats: &CleanupStats) {
        if stats.files_removed > 0 {
            println!(
                "🧹 Removed {} previous artifact(s) ({})",
                stats.files_removed,
                format_bytes(stats.bytes_freed)
            );
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Report with its tally, for scripting
    pub fn format_report(report: &Report) -> Result<String> {
        let json = serde_json::json!({
            "identical": report.is_identical(),
            "difference_count": report.difference_count(),
            "report": report,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }

    pub fn format_exclusions(target: &DriveTarget, exclusions: Option<&IndexSet<String>>) -> Result<String> {
        let json = serde_json::json!({
            "target": target,
            "mapped": exclusions.is_some(),
            "exclusions": exclusions.map(|set| set.iter().collect::<Vec<_>>()).unwrap_or_default(),
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

/// Format bytes in human-readable format
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
