//! CSV export of audit results for spreadsheet review.
//!
//! Two files per run: `divisions.csv` with one row per division, and
//! `employees.csv` with one row per employee per division. Rows follow
//! the engine's ordering, so exports are deterministic.

use std::path::Path;

use ffbaudit_recon::{AuditResult, BunchCounts};

use crate::CliError;

pub fn write_csv_reports(result: &AuditResult, dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::runtime(format!("cannot create {}: {e}", dir.display())))?;
    write_divisions(result, &dir.join("divisions.csv"))?;
    write_employees(result, &dir.join("employees.csv"))
}

fn write_divisions(result: &AuditResult, path: &Path) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;

    let mut header = vec![
        "division_id",
        "division_name",
        "kerani_total",
        "mandor_total",
        "asisten_total",
        "kerani_verified",
        "verification_rate",
        "total_differences",
    ];
    header.extend(BunchCounts::FIELD_NAMES);
    writer
        .write_record(&header)
        .map_err(|e| CliError::runtime(e.to_string()))?;

    for division in &result.divisions {
        let mut record = vec![
            division.division_id.clone(),
            division.division_name.clone(),
            division.kerani_total.to_string(),
            division.mandor_total.to_string(),
            division.asisten_total.to_string(),
            division.kerani_verified.to_string(),
            format!("{:.2}", division.verification_rate),
            division.total_differences.to_string(),
        ];
        for name in BunchCounts::FIELD_NAMES {
            let count = division.field_differences.get(name).copied().unwrap_or(0);
            record.push(count.to_string());
        }
        writer
            .write_record(&record)
            .map_err(|e| CliError::runtime(e.to_string()))?;
    }

    writer.flush().map_err(|e| CliError::runtime(e.to_string()))
}

fn write_employees(result: &AuditResult, path: &Path) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;

    writer
        .write_record([
            "division_id",
            "employee_id",
            "name",
            "role",
            "transaction_count",
            "verified_count",
            "discrepancy_count",
            "contribution_pct",
        ])
        .map_err(|e| CliError::runtime(e.to_string()))?;

    for division in &result.divisions {
        for employee in &division.employees {
            writer
                .write_record([
                    division.division_id.clone(),
                    employee.employee_id.clone(),
                    employee.name.clone(),
                    employee.role.to_string(),
                    employee.transaction_count.to_string(),
                    employee.verified_count.to_string(),
                    employee.discrepancy_count.to_string(),
                    format!("{:.2}", employee.contribution_pct),
                ])
                .map_err(|e| CliError::runtime(e.to_string()))?;
        }
    }

    writer.flush().map_err(|e| CliError::runtime(e.to_string()))
}
