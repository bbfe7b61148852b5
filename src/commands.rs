//! Command implementations for drivecurate CLI

use crate::cli::{Commands, OutputFormat};
use crate::compare::{ComparisonMode, DifferenceEngine};
use crate::config::{AuxConfig, CurationConfig, ReleaseTables};
use crate::curation::{CuratedSection, CurationPipeline};
use crate::data::{load_table, DataProcessor, WorkbookReader};
use crate::error::{CurateError, Result};
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::report::{ReportFormatter, ReportHeader, DEFAULT_COMPARE_COLUMNS};
use crate::revision::DriveTarget;
use crate::table::Table;
use crate::workspace::OutputDir;
use rayon::prelude::*;
use std::path::Path;

/// Execute a command
pub fn execute_command(command: Commands, quiet: bool) -> Result<()> {
    match command {
        Commands::Compare {
            expected,
            actual,
            sheet,
            columns,
            numeric,
            output_dir,
            report,
            format,
            no_export,
        } => compare_command(
            &CompareOptions {
                expected: &expected,
                actual: &actual,
                sheet: sheet.as_deref(),
                columns,
                numeric,
                output_dir: output_dir.as_deref(),
                report: report.as_deref(),
                format: &format,
                export: !no_export,
            },
            quiet,
        ),
        Commands::Curate {
            workbook,
            config,
            tables,
            aux,
            output_dir,
            clean,
            sequential,
        } => curate_command(
            &workbook,
            config.as_deref(),
            tables.as_deref(),
            aux.as_deref(),
            output_dir.as_deref(),
            clean,
            sequential,
            quiet,
        ),
        Commands::Exclusions {
            family,
            major,
            minor,
            tables,
            format,
        } => exclusions_command(DriveTarget::new(family, major, minor), tables.as_deref(), &format),
        Commands::Check { config, tables } => check_command(config.as_deref(), tables.as_deref()),
        Commands::Init { force, output } => init_command(&output, force),
    }
}

/// Arguments of the compare command
struct CompareOptions<'a> {
    expected: &'a Path,
    actual: &'a Path,
    sheet: Option<&'a str>,
    columns: Vec<String>,
    numeric: bool,
    output_dir: Option<&'a Path>,
    report: Option<&'a Path>,
    format: &'a str,
    export: bool,
}

/// Compare two parameter tables and report every differing cell
fn compare_command(options: &CompareOptions<'_>, quiet: bool) -> Result<()> {
    let format = OutputFormat::parse(options.format).map_err(CurateError::invalid_input)?;

    let columns = if options.columns.is_empty() {
        DEFAULT_COMPARE_COLUMNS.iter().map(|c| c.to_string()).collect()
    } else {
        options.columns.clone()
    };

    let mut progress = if quiet || format == OutputFormat::Json {
        ProgressReporter::new_minimal()
    } else {
        ProgressReporter::new_for_compare()
    };

    let expected = load_table(options.expected, options.sheet, None)?;
    let actual = load_table(options.actual, options.sheet, None)?;
    progress.finish_load(&format!("Loaded {} and {} rows", expected.len(), actual.len()));
    log::info!(
        "Comparing {} ({} rows) against {} ({} rows)",
        options.expected.display(),
        expected.len(),
        options.actual.display(),
        actual.len()
    );

    let mode = if options.numeric {
        ComparisonMode::Numeric
    } else {
        ComparisonMode::Exact
    };
    let comparison = DifferenceEngine::new(mode).compare(&expected, &actual, &columns)?;
    log::debug!("{} differing cell(s)", comparison.total_differences());

    let formatter = ReportFormatter::default();
    let report = formatter.format(&expected, &actual, &comparison)?;

    let mut written = Vec::new();
    if options.export && !report.is_identical() {
        let output = OutputDir::create_or_current(options.output_dir)?;
        let processor = DataProcessor::new()?;
        for (title, table) in formatter.export_per_column(&expected, &actual, &comparison)? {
            progress.update_export(&format!("Writing {}", title));
            let path = output.export_path(&title);
            processor.write_csv(&table, &path)?;
            log::info!("Wrote {} difference(s) to {}", table.len(), path.display());
            written.push(path);
        }
    }

    if let Some(report_name) = options.report {
        let path = match options.output_dir {
            Some(dir) => OutputDir::create(dir)?.report_path(report_name),
            None => report_name.to_path_buf(),
        };
        let header = ReportHeader::new(
            options.expected.display().to_string(),
            options.actual.display().to_string(),
        );
        report.write_text(&path, Some(&header))?;
        log::info!("Wrote report to {}", path.display());
        written.push(path);
    }
    progress.finish_export("Done");
    drop(progress);

    match format {
        OutputFormat::Json => println!("{}", JsonFormatter::format_report(&report)?),
        OutputFormat::Pretty => {
            PrettyPrinter::print_report(&report);
            PrettyPrinter::print_written(&written);
        }
    }

    Ok(())
}

/// Curate the configured sections of a parameter database workbook
#[allow(clippy::too_many_arguments)]
fn curate_command(
    workbook: &Path,
    config_path: Option<&Path>,
    tables_path: Option<&Path>,
    aux_path: Option<&Path>,
    output_dir: Option<&Path>,
    clean: bool,
    sequential: bool,
    quiet: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let tables = ReleaseTables::load_or_builtin(tables_path)?;
    let aux = match aux_path {
        Some(path) => AuxConfig::load(path)?,
        None => AuxConfig::default(),
    };
    if config.derivation.is_some() && aux.is_empty() {
        log::warn!("No DHCF configuration given: hardware parameters in the derivation section cannot be filled");
    }

    let pipeline = CurationPipeline::new(&config, &tables, &aux)?;
    if !pipeline.revision_mapped() {
        log::warn!(
            "Revision {} has no exclusion entry: no releases will be excluded",
            config.target
        );
    }
    log::debug!("Excluded releases: {:?}", pipeline.exclusions());

    let mut progress = if quiet {
        ProgressReporter::new_minimal()
    } else {
        ProgressReporter::new_for_curation(config.sheets.len() as u64)
    };

    let sections = load_sections(workbook, &config)?;
    progress.finish_load(&format!("Loaded {} section(s)", sections.len()));

    let curate_one = |(section, raw): &(String, Table)| -> Result<CuratedSection> {
        let curated = pipeline.curate(section, raw)?;
        progress.section_done(section);
        Ok(curated)
    };
    let curated: Vec<CuratedSection> = if sequential {
        sections.iter().map(curate_one).collect::<Result<_>>()?
    } else {
        sections.par_iter().map(curate_one).collect::<Result<_>>()?
    };
    progress.finish_sections("Curated");

    for section in &curated {
        for stage in &section.summary.stages {
            log::debug!(
                "{}: {} {} -> {}",
                section.summary.section,
                stage.stage,
                stage.rows_before,
                stage.rows_after
            );
        }
    }

    let output = OutputDir::create_or_current(output_dir)?;
    if clean {
        PrettyPrinter::print_cleanup(&output.clean(&config.sheets)?);
    }

    let processor = DataProcessor::new()?;
    let mut written = Vec::with_capacity(curated.len());
    for section in &curated {
        let path = output.section_path(&section.summary.section);
        progress.update_export(&format!("Writing {}", path.display()));
        processor.write_csv(&section.table, &path)?;
        log::info!("Wrote {} rows to {}", section.table.len(), path.display());
        written.push(path);
    }
    progress.finish_export("Done");
    drop(progress);

    let summaries: Vec<_> = curated.into_iter().map(|s| s.summary).collect();
    PrettyPrinter::print_curation_summaries(&config.target, &summaries);
    PrettyPrinter::print_written(&written);

    Ok(())
}

/// Read every configured sheet, restricted to the configured columns
fn load_sections(workbook: &Path, config: &CurationConfig) -> Result<Vec<(String, Table)>> {
    let mut reader = WorkbookReader::open(workbook)?;

    config
        .sheets
        .iter()
        .map(|sheet| -> Result<(String, Table)> {
            let table = reader.load_sheet(sheet, Some(&config.columns))?;
            log::info!("Loaded {} rows from '{}'", table.len(), sheet);
            Ok((sheet.clone(), table))
        })
        .collect()
}

/// Print the releases excluded for a drive revision
fn exclusions_command(target: DriveTarget, tables_path: Option<&Path>, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format).map_err(CurateError::invalid_input)?;
    let tables = ReleaseTables::load_or_builtin(tables_path)?;
    let resolved = tables.policy().resolve(&target.family, target.major, target.minor);

    match format {
        OutputFormat::Json => println!("{}", JsonFormatter::format_exclusions(&target, resolved.as_ref())?),
        OutputFormat::Pretty => PrettyPrinter::print_exclusions(&target, resolved.as_ref()),
    }

    Ok(())
}

/// Validate config and release tables before a curation run
fn check_command(config_path: Option<&Path>, tables_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let tables = ReleaseTables::load_or_builtin(tables_path)?;

    let issues = tables.validate(&config.target);
    PrettyPrinter::print_check_results(&config.target, &issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(CurateError::config(format!(
            "{} configuration issue(s) found",
            issues.len()
        )))
    }
}

/// Write the default curation config
fn init_command(output: &Path, force: bool) -> Result<()> {
    CurationConfig::default().save(output, force)?;

    println!("✅ Wrote default curation config to: {}", output.display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CurationConfig> {
    match path {
        Some(path) => {
            log::debug!("Loading config from {}", path.display());
            CurationConfig::load(path)
        }
        None => {
            let config = CurationConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}
