// Row-level validation: locating the unit identifier in a raw row and
// deciding which rows count as real units.

use crate::classify::is_unit_column;
use crate::types::RawRow;

/// Exact header names probed first when locating a unit identifier.
const UNIT_KEYS: &[&str] = &["unit", "Unit", "UNIT", "apt", "apartment", "room", "Room"];

/// Identifier fragments that mark spreadsheet aggregate/footer rows.
const AGGREGATE_VALUES: &[&str] = &[
    "total",
    "sum",
    "average",
    "avg",
    "count",
    "header",
    "n/a",
    "na",
    "grand total",
    "subtotal",
    "summary",
    "totals",
    "grand",
    "sub total",
];

/// How a row scan reacts to rows without a usable unit identifier.
///
/// The two policies stay distinct on purpose: an automatic spreadsheet load
/// must tolerate footer junk anywhere in the table, while the manual preview
/// trusts the user-picked column and treats the first gap as end of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndPolicy {
    /// Drop rows with a missing or aggregate-looking identifier, keep going.
    SkipAggregates,
    /// Terminate the scan at the first blank identifier.
    StopAtBlank,
}

/// Extract a candidate unit identifier from a row.
///
/// Probes the exact key names first, then falls back to the first key (in
/// header order) whose lower-cased name contains "unit" with a non-empty
/// value. Returns the trimmed value.
pub fn find_unit_value(row: &RawRow) -> Option<String> {
    for key in UNIT_KEYS {
        if let Some(value) = row.get(key) {
            if !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
    }
    for (column, value) in row.iter() {
        if column.to_lowercase().contains("unit") && !value.trim().is_empty() {
            return Some(value.trim().to_string());
        }
    }
    None
}

/// Whether an identifier names a real unit rather than a summary/footer row.
pub fn is_valid_unit(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return false;
    }
    !AGGREGATE_VALUES.iter().any(|token| value.contains(token))
}

/// Walk `rows` in order, resolving each row's unit identifier and yielding
/// `(raw_index, unit)` pairs for the rows that survive.
///
/// With an explicit `unit_column` the identifier is that cell's trimmed
/// value; otherwise `find_unit_value` decides, and the aggregate exclusion
/// list applies on top. A hand-picked column is trusted as-is.
pub fn scan_units(
    rows: &[RawRow],
    unit_column: Option<&str>,
    policy: EndPolicy,
) -> Vec<(usize, String)> {
    let mut found = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let unit = match unit_column {
            Some(column) => row
                .get(column)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            None => find_unit_value(row).filter(|v| is_valid_unit(v)),
        };
        match unit {
            Some(unit) => found.push((index, unit)),
            None => match policy {
                EndPolicy::SkipAggregates => continue,
                EndPolicy::StopAtBlank => break,
            },
        }
    }
    found
}

/// Union of column names observed across (up to) the first 50 rows, sorted.
///
/// Column membership is not required to be uniform across rows; sparse rows
/// simply contribute the keys they have.
pub fn unique_columns(rows: &[RawRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows.iter().take(50) {
        for name in row.columns() {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns.sort();
    columns
}

/// Default unit column for the picker: the first column whose name looks
/// like a unit identifier, else the first column.
pub fn detect_unit_column(columns: &[String]) -> Option<&str> {
    columns
        .iter()
        .find(|column| is_unit_column(column))
        .or_else(|| columns.first())
        .map(String::as_str)
}
