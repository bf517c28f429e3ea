//! `ffbaudit run` / `ffbaudit validate` — config-driven audit runs.

use std::path::{Path, PathBuf};

use ffbaudit_io::{load_directory, load_division_map, load_targets, parse_table, read_to_string};
use ffbaudit_recon::config::SourceFormat;
use ffbaudit_recon::directory::{DivisionMap, EmployeeDirectory};
use ffbaudit_recon::ingest::{load_csv_rows, LoadReport};
use ffbaudit_recon::{AuditConfig, AuditInput, ScanRecord};

use crate::exit_codes::{EXIT_ADJUSTMENT_WARNINGS, EXIT_RATE_BELOW_THRESHOLD};
use crate::{export, CliError};

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    csv_dir: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::runtime(format!("cannot read config: {e}")))?;
    let config =
        AuditConfig::from_toml(&config_str).map_err(|e| CliError::config(e.to_string()))?;

    // File paths in the config resolve relative to the config file.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let divisions = match &config.division_map {
        Some(file_ref) => load_division_map(&base_dir.join(&file_ref.file))
            .map_err(|e| CliError::runtime(e.to_string()))?,
        None => DivisionMap::new(),
    };

    let (rows, report) = load_rows(&config, base_dir, &divisions)?;

    let directory = match &config.directory {
        Some(file_ref) => load_directory(&base_dir.join(&file_ref.file))
            .map_err(|e| CliError::runtime(e.to_string()))?,
        None => EmployeeDirectory::new(),
    };

    let targets = match &config.targets {
        Some(targets_config) => Some(
            load_targets(&base_dir.join(&targets_config.file))
                .map_err(|e| CliError::runtime(e.to_string()))?,
        ),
        None => None,
    };

    let input = AuditInput {
        rows,
        directory,
        targets,
    };
    let result =
        ffbaudit_recon::run(&config, &input).map_err(|e| CliError::runtime(e.to_string()))?;

    // Output
    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

    let json_path = output_file.or_else(|| {
        config
            .output
            .json
            .as_ref()
            .map(|file| base_dir.join(file))
    });
    if let Some(ref path) = json_path {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref dir) = csv_dir {
        export::write_csv_reports(&result, dir)?;
        eprintln!("wrote {}", dir.join("divisions.csv").display());
        eprintln!("wrote {}", dir.join("employees.csv").display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    for division in &result.divisions {
        eprintln!(
            "division {} '{}': {} kerani, {} mandor, {} asisten, {} verified ({:.2}%), {} differences",
            division.division_id,
            division.division_name,
            division.kerani_total,
            division.mandor_total,
            division.asisten_total,
            division.kerani_verified,
            division.verification_rate,
            division.total_differences,
        );
    }

    if !quiet {
        let skipped: usize = result.divisions.iter().map(|d| d.skipped.total()).sum();
        if skipped > 0 {
            eprintln!("note: {skipped} rows skipped (unknown role or blank keys)");
        }
        if report.skipped_bad_date + report.skipped_bad_count > 0 {
            eprintln!(
                "note: {} rows dropped at ingestion ({} bad dates, {} bad counts)",
                report.skipped_bad_date + report.skipped_bad_count,
                report.skipped_bad_date,
                report.skipped_bad_count,
            );
        }
    }

    if let Some(ref adjustment) = result.adjustment {
        eprintln!(
            "adjustment: {} employee(s) adjusted",
            adjustment.entries.len()
        );
        for warning in &adjustment.warnings {
            eprintln!("warning: {warning}");
        }
    }

    // Threshold and warning exit codes, rate violations first.
    if let Some(threshold) = config.options.min_verification_rate {
        let below: Vec<&str> = result
            .divisions
            .iter()
            .filter(|d| d.verification_rate < threshold)
            .map(|d| d.division_id.as_str())
            .collect();
        if !below.is_empty() {
            return Err(CliError {
                code: EXIT_RATE_BELOW_THRESHOLD,
                message: format!(
                    "verification rate below {threshold}% in: {}",
                    below.join(", ")
                ),
                hint: None,
            });
        }
    }

    if let Some(ref adjustment) = result.adjustment {
        if !adjustment.warnings.is_empty() {
            return Err(CliError {
                code: EXIT_ADJUSTMENT_WARNINGS,
                message: "adjustment finished with warnings".to_string(),
                hint: None,
            });
        }
    }

    Ok(())
}

fn load_rows(
    config: &AuditConfig,
    base_dir: &Path,
    divisions: &DivisionMap,
) -> Result<(Vec<ScanRecord>, LoadReport), CliError> {
    let source_path = base_dir.join(&config.source.file);
    let text = read_to_string(&source_path).map_err(|e| CliError::runtime(e.to_string()))?;

    match config.source.format {
        SourceFormat::Csv => load_csv_rows(&text, &config.source.columns, divisions)
            .map_err(|e| CliError::runtime(e.to_string())),
        SourceFormat::Isql => {
            let table = parse_table(&text).map_err(|e| CliError::runtime(e.to_string()))?;
            ffbaudit_io::isql::scan_records(&table, &config.source.columns, divisions)
                .map_err(|e| CliError::runtime(e.to_string()))
        }
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::runtime(format!("cannot read config: {e}")))?;

    match AuditConfig::from_toml(&config_str) {
        Ok(config) => {
            let divisions = if config.divisions.is_empty() {
                "divisions derived from data".to_string()
            } else {
                format!("{} division(s)", config.divisions.len())
            };
            eprintln!(
                "valid: audit '{}' over {}..{} ({} source, {divisions})",
                config.name, config.period.start, config.period.end, config.source.format,
            );
            Ok(())
        }
        Err(e) => Err(CliError::config(e.to_string())),
    }
}
