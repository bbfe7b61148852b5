//! Output directory management for generated tables and reports

use crate::error::Result;
use crate::report::EXPORT_TITLE_PREFIX;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory receiving curated sections, difference exports and reports
#[derive(Debug, Clone)]
pub struct OutputDir {
    /// Directory path
    pub root: PathBuf,
}

impl OutputDir {
    /// Create the directory if needed
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Use `path`, or the current directory when absent
    pub fn create_or_current(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::create(path),
            None => Self::create(std::env::current_dir()?),
        }
    }

    /// Path of the curated CSV for a section
    pub fn section_path(&self, section: &str) -> PathBuf {
        self.root.join(format!("{}.csv", file_safe(section)))
    }

    /// Path of the per-column difference export for an export title
    pub fn export_path(&self, title: &str) -> PathBuf {
        self.root.join(format!("{}.csv", file_safe(title)))
    }

    /// Path for a report file name given relative to the directory
    pub fn report_path(&self, name: &Path) -> PathBuf {
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.root.join(name)
        }
    }

    /// Generated artifacts directly inside the directory: difference exports
    /// and the curated CSVs of the named sections
    pub fn artifacts(&self, sections: &[String]) -> Result<Vec<PathBuf>> {
        let section_files: Vec<String> = sections
            .iter()
            .map(|section| format!("{}.csv", file_safe(section)))
            .collect();

        let mut artifacts = Vec::new();

        if !self.root.exists() {
            return Ok(artifacts);
        }

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file() && is_artifact(entry.path(), &section_files) {
                artifacts.push(entry.path().to_path_buf());
            }
        }

        artifacts.sort();
        Ok(artifacts)
    }

    /// Remove generated artifacts from earlier runs; other files are left alone
    pub fn clean(&self, sections: &[String]) -> Result<CleanupStats> {
        let mut stats = CleanupStats::default();

        for path in self.artifacts(sections)? {
            if let Ok(metadata) = fs::metadata(&path) {
                stats.bytes_freed += metadata.len();
            }
            fs::remove_file(&path)?;
            stats.files_removed += 1;
            log::debug!("Removed {}", path.display());
        }

        if stats.files_removed > 0 {
            log::info!(
                "Removed {} previous artifact(s) from {}",
                stats.files_removed,
                self.root.display()
            );
        }

        Ok(stats)
    }
}

/// Statistics about cleanup operations
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub files_removed: usize,
    pub bytes_freed: u64,
}

fn is_artifact(path: &Path, section_files: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let is_export = name.starts_with(EXPORT_TITLE_PREFIX)
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

    is_export || section_files.iter().any(|file| file == name)
}

/// Replace path separators so sheet names and titles stay single file names
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}
