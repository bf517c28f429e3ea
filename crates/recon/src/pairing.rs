use std::collections::BTreeMap;

use crate::classify::Role;
use crate::engine::ReconOptions;
use crate::model::{BunchCounts, ScanRecord, VerifiedPair};

/// Rows sharing one transaction number, each pre-classified. Input order
/// is preserved so candidate selection is deterministic.
pub type TransactionGroup<'a> = Vec<(Role, &'a ScanRecord)>;

/// Index classified rows by transaction number.
pub fn group_by_transaction<'a>(
    rows: &[(Role, &'a ScanRecord)],
) -> BTreeMap<&'a str, TransactionGroup<'a>> {
    let mut groups: BTreeMap<&str, TransactionGroup<'_>> = BTreeMap::new();
    for (role, record) in rows {
        groups
            .entry(record.transaction_no.as_str())
            .or_default()
            .push((*role, record));
    }
    groups
}

/// Choose at most one verifying scan for a Kerani scan from its
/// transaction group.
///
/// Candidates are the non-Kerani rows of the group. Asisten wins over
/// Mandor when both are present; among same-role candidates the first in
/// input order wins. The Asisten priority was reverse-engineered against
/// reference reports, not taken from a written business rule.
pub fn select_verifier<'a>(
    group: &TransactionGroup<'a>,
    options: &ReconOptions,
) -> Option<(Role, &'a ScanRecord)> {
    let qualifies = |record: &ScanRecord| {
        !options.require_confirmed_status || record.status == options.confirmed_status
    };

    let mut first_mandor = None;
    for (role, record) in group {
        match role {
            Role::Asisten if qualifies(record) => return Some((Role::Asisten, record)),
            Role::Mandor if first_mandor.is_none() && qualifies(record) => {
                first_mandor = Some((Role::Mandor, *record));
            }
            _ => {}
        }
    }
    first_mandor
}

/// Pair a Kerani scan with its verifier and compute field deltas.
pub fn build_pair(
    kerani: &ScanRecord,
    verifier_role: Role,
    verifier: &ScanRecord,
) -> VerifiedPair {
    let (deltas, diff_count) = BunchCounts::diff(&verifier.counts, &kerani.counts);
    VerifiedPair {
        transaction_no: kerani.transaction_no.clone(),
        kerani_employee: kerani.employee_id.clone(),
        verifier_employee: verifier.employee_id.clone(),
        verifier_role,
        deltas,
        diff_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(employee: &str, tag: &str, trans: &str, status: i64) -> ScanRecord {
        ScanRecord {
            employee_id: employee.into(),
            role_tag: tag.into(),
            transaction_no: trans.into(),
            date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
            division_id: "OM1".into(),
            status,
            counts: BunchCounts::default(),
        }
    }

    fn classified(records: &[ScanRecord]) -> Vec<(Role, &ScanRecord)> {
        records
            .iter()
            .map(|r| (Role::classify(&r.role_tag), r))
            .collect()
    }

    const NO_FILTER: ReconOptions = ReconOptions {
        require_confirmed_status: false,
        confirmed_status: 724,
    };

    #[test]
    fn mandor_selected_when_only_candidate() {
        let records = vec![record("10", "KR", "T1", 724), record("20", "MN", "T1", 724)];
        let rows = classified(&records);
        let groups = group_by_transaction(&rows);
        let (role, verifier) = select_verifier(&groups["T1"], &NO_FILTER).unwrap();
        assert_eq!(role, Role::Mandor);
        assert_eq!(verifier.employee_id, "20");
    }

    #[test]
    fn asisten_wins_over_mandor() {
        // Mandor appears first in input order; Asisten still wins.
        let records = vec![
            record("10", "KR", "T1", 724),
            record("20", "MN", "T1", 724),
            record("30", "AS", "T1", 724),
        ];
        let rows = classified(&records);
        let groups = group_by_transaction(&rows);
        let (role, verifier) = select_verifier(&groups["T1"], &NO_FILTER).unwrap();
        assert_eq!(role, Role::Asisten);
        assert_eq!(verifier.employee_id, "30");
    }

    #[test]
    fn first_same_role_candidate_wins() {
        let records = vec![
            record("10", "KR", "T1", 724),
            record("21", "MN", "T1", 724),
            record("22", "MN", "T1", 724),
        ];
        let rows = classified(&records);
        let groups = group_by_transaction(&rows);
        let (_, verifier) = select_verifier(&groups["T1"], &NO_FILTER).unwrap();
        assert_eq!(verifier.employee_id, "21");
    }

    #[test]
    fn no_candidate_means_unverified() {
        let records = vec![record("10", "KR", "T1", 724)];
        let rows = classified(&records);
        let groups = group_by_transaction(&rows);
        assert!(select_verifier(&groups["T1"], &NO_FILTER).is_none());
    }

    #[test]
    fn status_filter_demotes_unconfirmed_asisten() {
        let filtered = ReconOptions {
            require_confirmed_status: true,
            confirmed_status: 724,
        };
        let records = vec![
            record("10", "KR", "T1", 724),
            record("30", "AS", "T1", 0),
            record("20", "MN", "T1", 724),
        ];
        let rows = classified(&records);
        let groups = group_by_transaction(&rows);
        let (role, _) = select_verifier(&groups["T1"], &filtered).unwrap();
        assert_eq!(role, Role::Mandor);
    }
}
