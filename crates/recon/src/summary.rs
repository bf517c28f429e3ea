use std::collections::BTreeMap;

use crate::classify::Role;
use crate::directory::EmployeeDirectory;
use crate::model::{
    BunchCounts, DivisionSummary, EmployeeMetrics, ScanRecord, SkippedRows, VerifiedPair,
};

/// `(mandor + asisten) / kerani * 100`.
///
/// The denominator is the Kerani total alone. Dividing by the all-roles
/// total instead understates the rate; e.g. 264 Kerani, 14 Mandor and
/// 2 Asisten scans is a 6.06% rate, not 5.71%.
pub fn verification_rate(kerani_total: usize, mandor_total: usize, asisten_total: usize) -> f64 {
    if kerani_total == 0 {
        return 0.0;
    }
    (mandor_total + asisten_total) as f64 / kerani_total as f64 * 100.0
}

/// Assemble the division summary from the role buckets and verified pairs.
pub fn build_summary(
    division_id: &str,
    division_name: &str,
    kerani: &[&ScanRecord],
    mandor: &[&ScanRecord],
    asisten: &[&ScanRecord],
    pairs: Vec<VerifiedPair>,
    skipped: SkippedRows,
    directory: &EmployeeDirectory,
) -> DivisionSummary {
    let kerani_total = kerani.len();
    let mandor_total = mandor.len();
    let asisten_total = asisten.len();

    let mut field_differences: BTreeMap<String, u64> = BunchCounts::FIELD_NAMES
        .iter()
        .map(|name| (name.to_string(), 0u64))
        .collect();
    let mut total_differences = 0i64;
    for pair in &pairs {
        total_differences += i64::from(pair.diff_count);
        for (name, delta) in BunchCounts::FIELD_NAMES.iter().zip(pair.deltas.as_array()) {
            if delta != 0 {
                *field_differences.entry((*name).to_string()).or_insert(0) += 1;
            }
        }
    }

    let employees = build_employee_metrics(
        kerani_total,
        kerani,
        mandor,
        asisten,
        &pairs,
        directory,
    );

    DivisionSummary {
        division_id: division_id.to_string(),
        division_name: division_name.to_string(),
        kerani_total,
        mandor_total,
        asisten_total,
        kerani_verified: pairs.len(),
        total_differences,
        verification_rate: verification_rate(kerani_total, mandor_total, asisten_total),
        field_differences,
        pairs,
        employees,
        skipped,
    }
}

fn build_employee_metrics(
    kerani_total: usize,
    kerani: &[&ScanRecord],
    mandor: &[&ScanRecord],
    asisten: &[&ScanRecord],
    pairs: &[VerifiedPair],
    directory: &EmployeeDirectory,
) -> Vec<EmployeeMetrics> {
    let mut verified_by_employee: BTreeMap<&str, usize> = BTreeMap::new();
    let mut differences_by_employee: BTreeMap<&str, i64> = BTreeMap::new();
    for pair in pairs {
        *verified_by_employee
            .entry(pair.kerani_employee.as_str())
            .or_insert(0) += 1;
        *differences_by_employee
            .entry(pair.kerani_employee.as_str())
            .or_insert(0) += i64::from(pair.diff_count);
    }

    let mut metrics = Vec::new();

    for (id, count) in count_by_employee(kerani) {
        metrics.push(EmployeeMetrics {
            employee_id: id.to_string(),
            name: directory.get_name(id),
            role: Role::Kerani,
            transaction_count: count,
            verified_count: verified_by_employee.get(id).copied().unwrap_or(0),
            discrepancy_count: differences_by_employee.get(id).copied().unwrap_or(0),
            contribution_pct: 0.0,
        });
    }

    for (role, bucket) in [(Role::Mandor, mandor), (Role::Asisten, asisten)] {
        for (id, count) in count_by_employee(bucket) {
            let contribution_pct = if kerani_total == 0 {
                0.0
            } else {
                count as f64 / kerani_total as f64 * 100.0
            };
            metrics.push(EmployeeMetrics {
                employee_id: id.to_string(),
                name: directory.get_name(id),
                role,
                transaction_count: count,
                verified_count: 0,
                discrepancy_count: 0,
                contribution_pct,
            });
        }
    }

    metrics
}

/// Transaction counts per employee id, sorted by id.
fn count_by_employee<'a>(bucket: &[&'a ScanRecord]) -> BTreeMap<&'a str, usize> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in bucket {
        *counts.entry(record.employee_id.as_str()).or_insert(0) += 1;
    }
    counts
}
