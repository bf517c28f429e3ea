//! Loaders for the small lookup CSVs that accompany a scan extract.
//!
//! All three files are plain headered CSVs. Header matching is
//! case-insensitive so exports from spreadsheets survive a round trip
//! through title-casing.

use std::collections::BTreeMap;
use std::path::Path;

use ffbaudit_recon::directory::{DivisionMap, EmployeeDirectory};

use crate::error::IngestError;
use crate::isql::read_to_string;

/// Load `employee_id,name` rows into a directory.
pub fn load_directory(path: &Path) -> Result<EmployeeDirectory, IngestError> {
    let mut directory = EmployeeDirectory::new();
    for (id, value) in read_pairs(path, "employee directory", "employee_id", "name")? {
        directory.insert(id, value);
    }
    Ok(directory)
}

/// Load `field,division` rows into a field→division map.
pub fn load_division_map(path: &Path) -> Result<DivisionMap, IngestError> {
    let mut map = DivisionMap::new();
    for (field, division) in read_pairs(path, "division map", "field", "division")? {
        map.insert(field, division);
    }
    Ok(map)
}

/// Load `employee_id,target` rows. Targets must be non-negative
/// integers; anything else is rejected rather than silently zeroed.
pub fn load_targets(path: &Path) -> Result<BTreeMap<String, i64>, IngestError> {
    let mut targets = BTreeMap::new();
    for (id, raw) in read_pairs(path, "targets", "employee_id", "target")? {
        let value: i64 = raw.trim().parse().map_err(|_| IngestError::BadTarget {
            employee_id: id.clone(),
            value: raw.clone(),
        })?;
        if value < 0 {
            return Err(IngestError::BadTarget {
                employee_id: id,
                value: raw,
            });
        }
        targets.insert(id, value);
    }
    Ok(targets)
}

/// Read a two-column lookup CSV, returning (key, value) per record.
/// Extra columns are ignored; the two named columns must exist.
fn read_pairs(
    path: &Path,
    file_kind: &str,
    key_column: &str,
    value_column: &str,
) -> Result<Vec<(String, String)>, IngestError> {
    let data = read_to_string(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Csv(format!("{}: {e}", path.display())))?
        .clone();
    let key_idx = find_column(&headers, key_column).ok_or_else(|| IngestError::MissingColumn {
        file_kind: file_kind.to_string(),
        column: key_column.to_string(),
    })?;
    let value_idx =
        find_column(&headers, value_column).ok_or_else(|| IngestError::MissingColumn {
            file_kind: file_kind.to_string(),
            column: value_column.to_string(),
        })?;

    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::Csv(format!("{}: {e}", path.display())))?;
        let key = record.get(key_idx).unwrap_or_default().trim();
        if key.is_empty() {
            continue;
        }
        let value = record.get(value_idx).unwrap_or_default().trim();
        pairs.push((key.to_string(), value.to_string()));
    }
    Ok(pairs)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}
