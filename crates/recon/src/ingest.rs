use serde::Serialize;

use crate::config::ColumnMapping;
use crate::directory::DivisionMap;
use crate::error::AuditError;
use crate::model::{BunchCounts, ScanRecord};

/// Per-file skip accounting from ingestion. Mirrors the engine's
/// skip-not-crash stance: a bad date or count drops the row, only a
/// missing column is a hard error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped_bad_date: usize,
    pub skipped_bad_count: usize,
}

/// Dates as Firebird prints them: dialect-3 `2025-07-15`, dialect-1
/// `15-JUL-2025`.
pub fn parse_date(value: &str) -> Option<chrono::NaiveDate> {
    let value = value.trim();
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| chrono::NaiveDate::parse_from_str(value, "%d-%b-%Y"))
        .ok()
}

/// Legacy nulls print as empty or `<null>`; both count as zero.
pub fn parse_count(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("<null>") {
        return Some(0);
    }
    value.parse().ok()
}

/// Map one raw tabular row to a `ScanRecord` given resolved column
/// indices. Returns `None` (with the report bumped) when the row is
/// malformed.
pub fn build_record(
    cells: &[String],
    indices: &ColumnIndices,
    divisions: &DivisionMap,
    report: &mut LoadReport,
) -> Option<ScanRecord> {
    let cell = |index: usize| cells.get(index).map(String::as_str).unwrap_or("");

    let date = match parse_date(cell(indices.date)) {
        Some(date) => date,
        None => {
            report.skipped_bad_date += 1;
            return None;
        }
    };

    let mut counts = [0i64; 7];
    for (slot, index) in counts.iter_mut().zip(indices.counts) {
        match parse_count(cell(index)) {
            Some(value) => *slot = value,
            None => {
                report.skipped_bad_count += 1;
                return None;
            }
        }
    }

    let field = cell(indices.field).trim().to_string();
    report.loaded += 1;
    Some(ScanRecord {
        employee_id: cell(indices.employee_id).trim().to_string(),
        role_tag: cell(indices.role_tag).trim().to_string(),
        transaction_no: cell(indices.transaction_no).trim().to_string(),
        date,
        division_id: divisions.division_for(&field),
        // Status is auxiliary; unparseable values fall back to zero.
        status: cell(indices.status).trim().parse().unwrap_or(0),
        counts: BunchCounts::from_array(counts),
    })
}

/// Column positions resolved against a concrete header row.
#[derive(Debug, Clone, Copy)]
pub struct ColumnIndices {
    pub employee_id: usize,
    pub role_tag: usize,
    pub transaction_no: usize,
    pub date: usize,
    pub field: usize,
    pub status: usize,
    pub counts: [usize; 7],
}

impl ColumnIndices {
    pub fn resolve(headers: &[String], columns: &ColumnMapping) -> Result<Self, AuditError> {
        let idx = |name: &str| -> Result<usize, AuditError> {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| AuditError::MissingColumn {
                    column: name.to_string(),
                })
        };

        let count_columns = columns.counts.as_array();
        let mut counts = [0usize; 7];
        for (slot, name) in counts.iter_mut().zip(count_columns) {
            *slot = idx(name)?;
        }

        Ok(Self {
            employee_id: idx(&columns.employee_id)?,
            role_tag: idx(&columns.role_tag)?,
            transaction_no: idx(&columns.transaction_no)?,
            date: idx(&columns.date)?,
            field: idx(&columns.field)?,
            status: idx(&columns.status)?,
            counts,
        })
    }
}

/// Load scan records from CSV text through the configured column mapping.
pub fn load_csv_rows(
    csv_data: &str,
    columns: &ColumnMapping,
    divisions: &DivisionMap,
) -> Result<(Vec<ScanRecord>, LoadReport), AuditError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AuditError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let indices = ColumnIndices::resolve(&headers, columns)?;

    let mut rows = Vec::new();
    let mut report = LoadReport::default();

    for record in reader.records() {
        let record = record.map_err(|e| AuditError::Csv(e.to_string()))?;
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        if let Some(row) = build_record(&cells, &indices, divisions, &mut report) {
            rows.push(row);
        }
    }

    Ok((rows, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnMapping, CountColumns};

    fn columns() -> ColumnMapping {
        ColumnMapping {
            employee_id: "EMPID".into(),
            role_tag: "RECORDTAG".into(),
            transaction_no: "TRANSNO".into(),
            date: "TRANSDATE".into(),
            field: "FIELDNO".into(),
            status: "TRANSSTATUS".into(),
            counts: CountColumns {
                ripe: "BUNCHRIPE".into(),
                unripe: "BUNCHUNRIPE".into(),
                black: "BUNCHBLACK".into(),
                rotten: "BUNCHROTTEN".into(),
                long_stalk: "BUNCHLONGSTALK".into(),
                rat_damaged: "BUNCHRAT".into(),
                loose_fruit: "LOOSEFRUIT".into(),
            },
        }
    }

    const CSV: &str = "\
EMPID,RECORDTAG,TRANSNO,TRANSDATE,FIELDNO,TRANSSTATUS,BUNCHRIPE,BUNCHUNRIPE,BUNCHBLACK,BUNCHROTTEN,BUNCHLONGSTALK,BUNCHRAT,LOOSEFRUIT
4021,KR,T0001,2025-07-15,F012,724,10,2,0,1,0,0,15
4022,MN,T0001,2025-07-15,F012,724,10,3,0,1,0,0,15
";

    #[test]
    fn load_csv_basic() {
        let mut divisions = DivisionMap::new();
        divisions.insert("F012", "OM1");
        let (rows, report) = load_csv_rows(CSV, &columns(), &divisions).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(report.loaded, 2);
        assert_eq!(rows[0].employee_id, "4021");
        assert_eq!(rows[0].division_id, "OM1");
        assert_eq!(rows[0].counts.ripe, 10);
        assert_eq!(rows[0].counts.loose_fruit, 15);
        assert_eq!(rows[1].counts.unripe, 3);
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "EMPID,RECORDTAG\n4021,KR\n";
        let err = load_csv_rows(csv, &columns(), &DivisionMap::new()).unwrap_err();
        assert!(err.to_string().contains("TRANSNO"));
    }

    #[test]
    fn bad_date_skips_row() {
        let csv = CSV.replace("2025-07-15,F012,724,10,2", "JULY,F012,724,10,2");
        let (rows, report) = load_csv_rows(&csv, &columns(), &DivisionMap::new()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(report.skipped_bad_date, 1);
    }

    #[test]
    fn dialect_one_dates_accepted() {
        let csv = CSV.replace("2025-07-15,F012,724,10,2", "15-Jul-2025,F012,724,10,2");
        let (rows, _) = load_csv_rows(&csv, &columns(), &DivisionMap::new()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date.to_string(), "2025-07-15");
    }

    #[test]
    fn null_counts_are_zero() {
        let csv = CSV.replace(",724,10,2,", ",724,<null>,,");
        let (rows, report) = load_csv_rows(&csv, &columns(), &DivisionMap::new()).unwrap();
        assert_eq!(report.skipped_bad_count, 0);
        assert_eq!(rows[0].counts.ripe, 0);
        assert_eq!(rows[0].counts.unripe, 0);
    }

    #[test]
    fn non_numeric_count_skips_row() {
        let csv = CSV.replace(",724,10,2,", ",724,ten,2,");
        let (rows, report) = load_csv_rows(&csv, &columns(), &DivisionMap::new()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(report.skipped_bad_count, 1);
    }

    #[test]
    fn unmapped_field_forms_its_own_division() {
        let (rows, _) = load_csv_rows(CSV, &columns(), &DivisionMap::new()).unwrap();
        assert_eq!(rows[0].division_id, "F012");
    }
}
