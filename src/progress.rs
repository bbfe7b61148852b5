//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for load, curation and export phases.
///
/// Section updates take `&self` so parallel workers can share one reporter.
#[derive(Debug)]
pub struct ProgressReporter {
    pub load_pb: Option<ProgressBar>,
    pub sections_pb: Option<ProgressBar>,
    pub export_pb: Option<ProgressBar>,
    section_count: u64,
    show_progress: bool,
}

impl ProgressReporter {
    /// Reporter for a curation run over `section_count` sheets
    pub fn new_for_curation(section_count: u64) -> Self {
        Self {
            load_pb: Some(create_spinner("Loading workbook...")),
            sections_pb: None,
            export_pb: None,
            section_count,
            show_progress: true,
        }
    }

    /// Reporter for a table comparison
    pub fn new_for_compare() -> Self {
        Self {
            load_pb: Some(create_spinner("Loading tables...")),
            sections_pb: None,
            export_pb: None,
            section_count: 0,
            show_progress: true,
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            load_pb: None,
            sections_pb: None,
            export_pb: None,
            section_count: 0,
            show_progress: false,
        }
    }

    /// Finish loading and start the per-section bar
    pub fn finish_load(&mut self, message: &str) {
        if let Some(pb) = self.load_pb.take() {
            pb.finish_with_message(message.to_string());
        }
        if self.show_progress && self.section_count > 0 && self.sections_pb.is_none() {
            self.sections_pb = Some(create_progress_bar(self.section_count, "Curating sections"));
        }
    }

    /// Mark one section as curated
    pub fn section_done(&self, section: &str) {
        if let Some(pb) = &self.sections_pb {
            pb.set_message(section.to_string());
            pb.inc(1);
        }
    }

    pub fn finish_sections(&mut self, message: &str) {
        if let Some(pb) = self.sections_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    /// Update export progress message without finishing
    pub fn update_export(&mut self, message: &str) {
        if self.show_progress && self.export_pb.is_none() {
            self.export_pb = Some(create_spinner("Writing output..."));
        }
        if let Some(pb) = &self.export_pb {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_export(&mut self, message: &str) {
        if let Some(pb) = self.export_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        for pb in [self.load_pb.take(), self.sections_pb.take(), self.export_pb.take()]
            .into_iter()
            .flatten()
        {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
