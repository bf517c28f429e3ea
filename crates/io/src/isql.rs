use std::path::Path;

use ffbaudit_recon::config::ColumnMapping;
use ffbaudit_recon::directory::DivisionMap;
use ffbaudit_recon::ingest::{build_record, ColumnIndices, LoadReport};
use ffbaudit_recon::ScanRecord;

use crate::error::IngestError;

/// A parsed isql result set: header names and raw cell text per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsqlTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse the aligned table text Firebird's `isql` prints.
///
/// Layout: a header line, a separator line of `=` runs (one run per
/// column, single spaces between), then data lines padded to the column
/// widths. `isql` repeats the header/separator every page and appends
/// blank lines and a `N rows` trailer; all of those are skipped.
pub fn parse_table(text: &str) -> Result<IsqlTable, IngestError> {
    let mut lines = text.lines();

    let mut header_line = None;
    let mut separator_line = None;
    let mut previous: Option<&str> = None;
    for line in lines.by_ref() {
        if is_separator(line) {
            header_line = previous;
            separator_line = Some(line);
            break;
        }
        if !line.trim().is_empty() {
            previous = Some(line);
        }
    }

    let (header_line, separator_line) = match (header_line, separator_line) {
        (Some(h), Some(s)) => (h, s),
        _ => {
            return Err(IngestError::NotATable(
                "no header/separator line found".into(),
            ))
        }
    };

    let spans = column_spans(separator_line);
    let headers: Vec<String> = spans
        .iter()
        .map(|&(start, end)| slice_span(header_line, start, end))
        .collect();

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() || is_separator(line) {
            continue;
        }
        // Page-repeated header.
        if line == header_line {
            continue;
        }
        // Row-count trailer, e.g. "278 rows".
        let trimmed = line.trim();
        if trimmed.ends_with(" rows") || trimmed.ends_with(" row") {
            let prefix = trimmed
                .rsplit_once(' ')
                .map(|(p, _)| p)
                .unwrap_or_default();
            if prefix.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
        }

        let cells: Vec<String> = spans
            .iter()
            .map(|&(start, end)| slice_span(line, start, end))
            .collect();
        rows.push(cells);
    }

    Ok(IsqlTable { headers, rows })
}

/// Column byte spans from the separator line. The final column runs to
/// the end of each data line since isql does not pad the last cell.
fn column_spans(separator: &str) -> Vec<(usize, Option<usize>)> {
    let bytes = separator.as_bytes();
    let mut spans = Vec::new();
    let mut start = None;
    for (i, &b) in bytes.iter().enumerate() {
        match (b, start) {
            (b'=', None) => start = Some(i),
            (b' ', Some(s)) => {
                spans.push((s, Some(i)));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, None));
    }
    if let Some(last) = spans.last_mut() {
        last.1 = None;
    }
    spans
}

fn slice_span(line: &str, start: usize, end: Option<usize>) -> String {
    let len = line.len();
    // Spans come from the ASCII separator line, but data cells can hold
    // multi-byte text (Windows-1252 names decode to two-byte UTF-8), so
    // a span edge can land inside a character. Widen to the nearest
    // boundaries rather than panic.
    let mut start = start.min(len);
    while !line.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = end.map(|e| e.min(len)).unwrap_or(len);
    while !line.is_char_boundary(end) {
        end += 1;
    }
    line[start..end].trim().to_string()
}

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim_end();
    !trimmed.is_empty()
        && trimmed.contains('=')
        && trimmed.chars().all(|c| c == '=' || c == ' ')
}

/// Read a file as text: UTF-8 fast path, Windows-1252 fallback for the
/// legacy dialect deployments.
pub fn read_to_string(path: &Path) -> Result<String, IngestError> {
    let bytes = std::fs::read(path)
        .map_err(|e| IngestError::Io(format!("cannot read {}: {e}", path.display())))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(err.as_bytes());
            Ok(text.into_owned())
        }
    }
}

/// Map a parsed table to scan records through the configured columns.
pub fn scan_records(
    table: &IsqlTable,
    columns: &ColumnMapping,
    divisions: &DivisionMap,
) -> Result<(Vec<ScanRecord>, LoadReport), IngestError> {
    let indices = ColumnIndices::resolve(&table.headers, columns)?;
    let mut rows = Vec::new();
    let mut report = LoadReport::default();
    for cells in &table.rows {
        if let Some(record) = build_record(cells, &indices, divisions, &mut report) {
            rows.push(record);
        }
    }
    Ok((rows, report))
}
