use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use ffbaudit_recon::classify::Role;
use ffbaudit_recon::config::AuditConfig;
use ffbaudit_recon::directory::{DivisionMap, EmployeeDirectory};
use ffbaudit_recon::engine::{reconcile, run, AuditInput, Period, ReconOptions};
use ffbaudit_recon::ingest::load_csv_rows;
use ffbaudit_recon::model::{BunchCounts, ScanRecord};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture_input() -> (AuditConfig, AuditInput) {
    let dir = fixtures_dir();
    let config_str = std::fs::read_to_string(dir.join("july.audit.toml")).unwrap();
    let config = AuditConfig::from_toml(&config_str).unwrap();

    let csv_data = std::fs::read_to_string(dir.join(&config.source.file)).unwrap();
    let (rows, report) =
        load_csv_rows(&csv_data, &config.source.columns, &DivisionMap::new()).unwrap();
    assert_eq!(report.skipped_bad_date, 0);
    assert_eq!(report.skipped_bad_count, 0);

    let mut directory = EmployeeDirectory::new();
    directory.insert("4021", "SUPARMAN");
    directory.insert("4022", "BUDI HARTONO");

    let input = AuditInput {
        rows,
        directory,
        targets: None,
    };
    (config, input)
}

// -------------------------------------------------------------------------
// Full run over the fixture month
// -------------------------------------------------------------------------

#[test]
fn full_run_division_totals() {
    let (config, input) = load_fixture_input();
    let result = run(&config, &input).unwrap();

    assert_eq!(result.meta.config_name, "Sungai Lala July 2025");
    assert_eq!(result.divisions.len(), 2);

    let om1 = &result.divisions[0];
    assert_eq!(om1.division_id, "OM1");
    assert_eq!(om1.division_name, "Division I");
    assert_eq!(om1.kerani_total, 3);
    assert_eq!(om1.mandor_total, 2);
    assert_eq!(om1.asisten_total, 1);
    assert_eq!(om1.kerani_verified, 2);
    assert_eq!(om1.total_differences, 2);
    assert_eq!(om1.verification_rate, 100.0);
    assert_eq!(om1.skipped.unknown_role, 1);
    assert_eq!(om1.skipped.missing_transaction_no, 1);

    let om2 = &result.divisions[1];
    assert_eq!(om2.division_id, "OM2");
    // 2025-08-01 row excluded: end date is exclusive.
    assert_eq!(om2.kerani_total, 2);
    assert_eq!(om2.mandor_total, 1);
    assert_eq!(om2.kerani_verified, 1);
    assert_eq!(om2.total_differences, 0);
    assert_eq!(om2.verification_rate, 50.0);
}

#[test]
fn full_run_pair_details() {
    let (config, input) = load_fixture_input();
    let result = run(&config, &input).unwrap();
    let om1 = &result.divisions[0];

    // T0002 has both Mandor and Asisten verifiers; Asisten wins.
    let t2 = om1
        .pairs
        .iter()
        .find(|p| p.transaction_no == "T0002")
        .unwrap();
    assert_eq!(t2.verifier_role, Role::Asisten);
    assert_eq!(t2.verifier_employee, "4030");
    assert_eq!(t2.deltas.rat_damaged, 1);
    assert_eq!(t2.diff_count, 1);

    // T0001 only has a Mandor verifier.
    let t1 = om1
        .pairs
        .iter()
        .find(|p| p.transaction_no == "T0001")
        .unwrap();
    assert_eq!(t1.verifier_role, Role::Mandor);
    assert_eq!(t1.deltas.unripe, 1);

    assert_eq!(om1.field_differences["unripe"], 1);
    assert_eq!(om1.field_differences["rat_damaged"], 1);
    assert_eq!(om1.field_differences["ripe"], 0);
}

#[test]
fn full_run_employee_metrics() {
    let (config, input) = load_fixture_input();
    let result = run(&config, &input).unwrap();
    let om1 = &result.divisions[0];

    let kerani = om1
        .employees
        .iter()
        .find(|e| e.employee_id == "4021" && e.role == Role::Kerani)
        .unwrap();
    assert_eq!(kerani.name, "SUPARMAN");
    assert_eq!(kerani.transaction_count, 3);
    assert_eq!(kerani.verified_count, 2);
    assert_eq!(kerani.discrepancy_count, 2);

    let mandor = om1
        .employees
        .iter()
        .find(|e| e.employee_id == "4022" && e.role == Role::Mandor)
        .unwrap();
    assert_eq!(mandor.name, "BUDI HARTONO");
    assert_eq!(mandor.transaction_count, 2);
    assert!((mandor.contribution_pct - 66.666).abs() < 0.01);

    let asisten = om1
        .employees
        .iter()
        .find(|e| e.employee_id == "4030" && e.role == Role::Asisten)
        .unwrap();
    assert_eq!(asisten.name, "EMPLOYEE-4030");
    assert!((asisten.contribution_pct - 33.333).abs() < 0.01);
}

#[test]
fn full_run_with_targets() {
    let (config, mut input) = load_fixture_input();
    input.targets = Some(BTreeMap::from([("4021".to_string(), 5i64)]));

    let result = run(&config, &input).unwrap();
    let adjustment = result.adjustment.unwrap();
    assert_eq!(adjustment.entries.len(), 1);
    assert_eq!(adjustment.entries[0].original_total, 2);
    assert_eq!(adjustment.entries[0].target, 5);

    let total: i64 = result
        .divisions
        .iter()
        .flat_map(|d| &d.employees)
        .filter(|e| e.employee_id == "4021" && e.role == Role::Kerani)
        .map(|e| e.discrepancy_count)
        .sum();
    assert_eq!(total, 5);

    let om1 = &result.divisions[0];
    assert_eq!(om1.total_differences, 5);
}

#[test]
fn negative_target_rejected() {
    let (config, mut input) = load_fixture_input();
    input.targets = Some(BTreeMap::from([("4021".to_string(), -3i64)]));
    let err = run(&config, &input).unwrap_err();
    assert!(err.to_string().contains("negative target"));
}

#[test]
fn divisions_derived_from_data_when_unconfigured() {
    let (mut config, input) = load_fixture_input();
    config.divisions.clear();
    let result = run(&config, &input).unwrap();
    let ids: Vec<&str> = result
        .divisions
        .iter()
        .map(|d| d.division_id.as_str())
        .collect();
    assert_eq!(ids, ["OM1", "OM2"]);
    // Derived divisions use the id as the display name.
    assert_eq!(result.divisions[0].division_name, "OM1");
}

// -------------------------------------------------------------------------
// Reference rate scenario
// -------------------------------------------------------------------------

/// 264 kerani, 14 mandor, 2 asisten — drawn from real reconciliation
/// output. The rate must be 6.06%, not the 5.71% the all-roles
/// denominator would give.
#[test]
fn reference_month_verification_rate() {
    let date = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
    let record = |employee: &str, tag: &str, trans: String| ScanRecord {
        employee_id: employee.into(),
        role_tag: tag.into(),
        transaction_no: trans,
        date,
        division_id: "OM1".into(),
        status: 724,
        counts: BunchCounts::default(),
    };

    let mut rows = Vec::new();
    for i in 0..264 {
        rows.push(record("10", "KR", format!("T{i:04}")));
    }
    for i in 0..14 {
        rows.push(record("20", "MN", format!("T{i:04}")));
    }
    for i in 14..16 {
        rows.push(record("30", "AS", format!("T{i:04}")));
    }

    let period = Period {
        start: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
    };
    let options = ReconOptions {
        require_confirmed_status: false,
        confirmed_status: 724,
    };
    let summary = reconcile(
        &rows,
        "OM1",
        "Division I",
        &period,
        &EmployeeDirectory::new(),
        &options,
    );

    assert_eq!(summary.kerani_total, 264);
    assert_eq!(summary.mandor_total, 14);
    assert_eq!(summary.asisten_total, 2);
    assert_eq!(summary.kerani_verified, 16);
    assert!((summary.verification_rate - 6.0606).abs() < 0.01);
}
