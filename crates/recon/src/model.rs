use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::classify::Role;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// The fixed quantity fields of one harvest scan: category counts making up
/// the bunch tally, plus loose fruit. These are the fields compared when a
/// verifying scan exists for the same transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BunchCounts {
    pub ripe: i64,
    pub unripe: i64,
    pub black: i64,
    pub rotten: i64,
    pub long_stalk: i64,
    pub rat_damaged: i64,
    pub loose_fruit: i64,
}

impl BunchCounts {
    pub const FIELD_NAMES: [&'static str; 7] = [
        "ripe",
        "unripe",
        "black",
        "rotten",
        "long_stalk",
        "rat_damaged",
        "loose_fruit",
    ];

    pub fn as_array(&self) -> [i64; 7] {
        [
            self.ripe,
            self.unripe,
            self.black,
            self.rotten,
            self.long_stalk,
            self.rat_damaged,
            self.loose_fruit,
        ]
    }

    pub fn from_array(values: [i64; 7]) -> Self {
        Self {
            ripe: values[0],
            unripe: values[1],
            black: values[2],
            rotten: values[3],
            long_stalk: values[4],
            rat_damaged: values[5],
            loose_fruit: values[6],
        }
    }

    /// Signed per-field deltas (`verifier - kerani`) and the number of
    /// fields where the two scans disagree.
    pub fn diff(verifier: &Self, kerani: &Self) -> (Self, u32) {
        let v = verifier.as_array();
        let k = kerani.as_array();
        let mut deltas = [0i64; 7];
        let mut diff_count = 0u32;
        for i in 0..7 {
            deltas[i] = v[i] - k[i];
            if v[i] != k[i] {
                diff_count += 1;
            }
        }
        (Self::from_array(deltas), diff_count)
    }
}

/// One raw harvest-scan row, already typed by the ingestion layer.
#[derive(Debug, Clone)]
pub struct ScanRecord {
    pub employee_id: String,
    pub role_tag: String,
    pub transaction_no: String,
    pub date: NaiveDate,
    pub division_id: String,
    pub status: i64,
    pub counts: BunchCounts,
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

/// A Kerani scan matched to its chosen verifying scan. Computed fresh per
/// run, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedPair {
    pub transaction_no: String,
    pub kerani_employee: String,
    pub verifier_employee: String,
    pub verifier_role: Role,
    /// `verifier - kerani` per quantity field.
    pub deltas: BunchCounts,
    /// Number of quantity fields where the two scans disagree.
    pub diff_count: u32,
}

// ---------------------------------------------------------------------------
// Per-row drop accounting
// ---------------------------------------------------------------------------

/// Rows dropped during reconciliation, counted rather than logged so the
/// engine stays pure. Surfaced in CLI output as `note:` lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkippedRows {
    pub unknown_role: usize,
    pub missing_transaction_no: usize,
    pub missing_employee_id: usize,
}

impl SkippedRows {
    pub fn total(&self) -> usize {
        self.unknown_role + self.missing_transaction_no + self.missing_employee_id
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Per-employee rollup within one division.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeMetrics {
    pub employee_id: String,
    pub name: String,
    pub role: Role,
    pub transaction_count: usize,
    /// Kerani only: scans with a found verifier.
    pub verified_count: usize,
    /// Kerani only: sum of field-level differences over this employee's
    /// verified scans. The quantity the target adjustment redistributes.
    pub discrepancy_count: i64,
    /// Mandor/Asisten only: role total as a percentage of the division's
    /// Kerani total.
    pub contribution_pct: f64,
}

/// Aggregated verification statistics for one division and period.
#[derive(Debug, Clone, Serialize)]
pub struct DivisionSummary {
    pub division_id: String,
    pub division_name: String,
    pub kerani_total: usize,
    pub mandor_total: usize,
    pub asisten_total: usize,
    /// Count of Kerani scans with a matching verifying scan.
    pub kerani_verified: usize,
    /// Sum of `diff_count` over all verified pairs.
    pub total_differences: i64,
    /// `(mandor + asisten) / kerani * 100`. Zero when there are no Kerani
    /// scans. The denominator is Kerani scans only, never all scans.
    pub verification_rate: f64,
    /// Per quantity field: number of pairs where that field disagreed.
    pub field_differences: BTreeMap<String, u64>,
    pub pairs: Vec<VerifiedPair>,
    pub employees: Vec<EmployeeMetrics>,
    pub skipped: SkippedRows,
}

// ---------------------------------------------------------------------------
// Target adjustment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub division_id: String,
    pub delta: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentEntry {
    pub employee_id: String,
    pub original_total: i64,
    pub target: i64,
    pub allocations: Vec<Allocation>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdjustmentReport {
    pub entries: Vec<AdjustmentEntry>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AuditMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    pub meta: AuditMeta,
    pub divisions: Vec<DivisionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<AdjustmentReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_counts_unequal_fields_only() {
        let kerani = BunchCounts { ripe: 10, unripe: 2, ..Default::default() };
        let verifier = BunchCounts { ripe: 10, unripe: 3, ..Default::default() };
        let (deltas, diff_count) = BunchCounts::diff(&verifier, &kerani);
        assert_eq!(diff_count, 1);
        assert_eq!(deltas.ripe, 0);
        assert_eq!(deltas.unripe, 1);
    }

    #[test]
    fn diff_is_signed() {
        let kerani = BunchCounts { rotten: 5, loose_fruit: 12, ..Default::default() };
        let verifier = BunchCounts { rotten: 3, loose_fruit: 14, ..Default::default() };
        let (deltas, diff_count) = BunchCounts::diff(&verifier, &kerani);
        assert_eq!(deltas.rotten, -2);
        assert_eq!(deltas.loose_fruit, 2);
        assert_eq!(diff_count, 2);
    }

    #[test]
    fn field_names_align_with_array() {
        let counts = BunchCounts {
            ripe: 1,
            unripe: 2,
            black: 3,
            rotten: 4,
            long_stalk: 5,
            rat_damaged: 6,
            loose_fruit: 7,
        };
        assert_eq!(counts.as_array(), [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(BunchCounts::from_array(counts.as_array()), counts);
        assert_eq!(BunchCounts::FIELD_NAMES.len(), 7);
    }
}
