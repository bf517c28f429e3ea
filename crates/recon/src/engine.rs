use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::adjust::adjust;
use crate::classify::Role;
use crate::config::{AuditConfig, OptionsConfig, PeriodConfig};
use crate::directory::EmployeeDirectory;
use crate::error::AuditError;
use crate::model::{AuditMeta, AuditResult, DivisionSummary, ScanRecord, SkippedRows};
use crate::pairing::{build_pair, group_by_transaction, select_verifier};
use crate::summary::build_summary;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Reporting period: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

impl From<&PeriodConfig> for Period {
    fn from(config: &PeriodConfig) -> Self {
        Self {
            start: config.start,
            end: config.end,
        }
    }
}

/// Engine knobs relevant to verifier selection.
#[derive(Debug, Clone, Copy)]
pub struct ReconOptions {
    pub require_confirmed_status: bool,
    pub confirmed_status: i64,
}

impl From<&OptionsConfig> for ReconOptions {
    fn from(config: &OptionsConfig) -> Self {
        Self {
            require_confirmed_status: config.require_confirmed_status,
            confirmed_status: config.confirmed_status,
        }
    }
}

/// Pre-loaded data for one run: materialized scan rows, the employee
/// directory, and optional reference targets for the adjustment step.
pub struct AuditInput {
    pub rows: Vec<ScanRecord>,
    pub directory: EmployeeDirectory,
    pub targets: Option<BTreeMap<String, i64>>,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Reconcile every division in the period, then apply the target
/// adjustment when reference totals are configured.
pub fn run(config: &AuditConfig, input: &AuditInput) -> Result<AuditResult, AuditError> {
    if let Some(ref targets) = input.targets {
        for (employee_id, value) in targets {
            if *value < 0 {
                return Err(AuditError::InvalidTarget {
                    employee_id: employee_id.clone(),
                    value: *value,
                });
            }
        }
    }

    let period = Period::from(&config.period);
    let options = ReconOptions::from(&config.options);

    // Configured divisions, or every division seen in the data.
    let division_ids: Vec<String> = if config.divisions.is_empty() {
        let mut ids: BTreeSet<&str> = BTreeSet::new();
        for row in &input.rows {
            if period.contains(row.date) {
                ids.insert(row.division_id.as_str());
            }
        }
        ids.into_iter().map(String::from).collect()
    } else {
        config.divisions.keys().cloned().collect()
    };

    let mut divisions: Vec<DivisionSummary> = division_ids
        .iter()
        .map(|id| {
            reconcile(
                &input.rows,
                id,
                &config.division_name(id),
                &period,
                &input.directory,
                &options,
            )
        })
        .collect();

    let adjustment = match (&input.targets, &config.targets) {
        (Some(targets), targets_config) => {
            let fallback = targets_config
                .as_ref()
                .and_then(|t| t.fallback_division.as_deref());
            Some(adjust(&mut divisions, targets, fallback))
        }
        (None, _) => None,
    };

    Ok(AuditResult {
        meta: AuditMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        divisions,
        adjustment,
    })
}

// ---------------------------------------------------------------------------
// Reconcile one division
// ---------------------------------------------------------------------------

/// Reconcile one division over one period.
///
/// Filters to the requested division and `[start, end)` window, classifies
/// each row, pairs Kerani scans with their verifiers and aggregates the
/// summary. Pure: the same rows always produce the same summary. Rows with
/// an unknown role tag or a blank transaction number / employee id are
/// dropped and counted, never fatal.
pub fn reconcile(
    rows: &[ScanRecord],
    division_id: &str,
    division_name: &str,
    period: &Period,
    directory: &EmployeeDirectory,
    options: &ReconOptions,
) -> DivisionSummary {
    let mut skipped = SkippedRows::default();

    // Classify and drop, preserving input order.
    let mut classified: Vec<(Role, &ScanRecord)> = Vec::new();
    for row in rows {
        if row.division_id != division_id || !period.contains(row.date) {
            continue;
        }
        let role = Role::classify(&row.role_tag);
        if role == Role::Unknown {
            skipped.unknown_role += 1;
            continue;
        }
        if row.transaction_no.trim().is_empty() {
            skipped.missing_transaction_no += 1;
            continue;
        }
        if row.employee_id.trim().is_empty() {
            skipped.missing_employee_id += 1;
            continue;
        }
        classified.push((role, row));
    }

    let mut kerani: Vec<&ScanRecord> = Vec::new();
    let mut mandor: Vec<&ScanRecord> = Vec::new();
    let mut asisten: Vec<&ScanRecord> = Vec::new();
    for (role, record) in &classified {
        match role {
            Role::Kerani => kerani.push(record),
            Role::Mandor => mandor.push(record),
            Role::Asisten => asisten.push(record),
            Role::Unknown => {}
        }
    }

    let groups = group_by_transaction(&classified);

    let mut pairs = Vec::new();
    for record in &kerani {
        let group = &groups[record.transaction_no.as_str()];
        if let Some((role, verifier)) = select_verifier(group, options) {
            pairs.push(build_pair(record, role, verifier));
        }
    }

    build_summary(
        division_id,
        division_name,
        &kerani,
        &mandor,
        &asisten,
        pairs,
        skipped,
        directory,
    )
}
