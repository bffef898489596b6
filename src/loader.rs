// Spreadsheet ingestion: decode a CSV or Excel file into raw rows.
//
// Decoding is the only I/O boundary; everything downstream works on the
// in-memory table. Per-row decode failures are diagnostics, not errors;
// only an empty decoded table aborts.

use std::error::Error;
use std::io;
use std::path::Path;

use calamine::{open_workbook_auto, DataType, Reader};
use csv::ReaderBuilder;

use crate::types::RawRow;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub blank_rows: usize,
    pub parse_errors: usize,
}

/// Decode a spreadsheet into raw rows plus load diagnostics.
///
/// `.xlsx`/`.xlsm`/`.xls` files read the first worksheet; any other
/// extension is treated as CSV. Cell values become trimmed-key strings under
/// the header names; unnamed header cells are dropped, fully blank rows are
/// counted and skipped.
pub fn load_table(path: &str) -> Result<(Vec<RawRow>, LoadReport), Box<dyn Error>> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let (headers, records, parse_errors) = match extension.as_str() {
        "xlsx" | "xlsm" | "xls" => read_excel(path)?,
        _ => read_csv(path)?,
    };

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err("spreadsheet has no header row".into());
    }

    let total_rows = records.len();
    let (rows, blank_rows) = build_rows(&headers, records);
    if rows.is_empty() {
        return Err(format!("no data rows found in {}", path).into());
    }

    let report = LoadReport {
        total_rows,
        kept_rows: rows.len(),
        blank_rows,
        parse_errors,
    };
    Ok((rows, report))
}

/// Zip each record against the header row. Short records read as empty
/// cells, so sparse rows keep working downstream.
fn build_rows(headers: &[String], records: Vec<Vec<String>>) -> (Vec<RawRow>, usize) {
    let mut rows = Vec::new();
    let mut blank_rows = 0usize;
    for record in records {
        let mut row = RawRow::new();
        for (index, header) in headers.iter().enumerate() {
            let header = header.trim();
            if header.is_empty() {
                continue;
            }
            let value = record.get(index).map(String::as_str).unwrap_or("");
            row.insert(header, value);
        }
        if row.is_blank() {
            blank_rows += 1;
            continue;
        }
        rows.push(row);
    }
    (rows, blank_rows)
}

fn read_csv(path: &str) -> Result<(Vec<String>, Vec<Vec<String>>, usize), Box<dyn Error>> {
    let rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    decode_csv(rdr)
}

fn decode_csv<R: io::Read>(
    mut rdr: csv::Reader<R>,
) -> Result<(Vec<String>, Vec<Vec<String>>, usize), Box<dyn Error>> {
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut records = Vec::new();
    let mut parse_errors = 0usize;
    for result in rdr.records() {
        match result {
            Ok(record) => records.push(record.iter().map(|f| f.to_string()).collect()),
            Err(_) => parse_errors += 1,
        }
    }
    Ok((headers, records, parse_errors))
}

fn read_excel(path: &str) -> Result<(Vec<String>, Vec<Vec<String>>, usize), Box<dyn Error>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or("workbook has no worksheets")??;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .ok_or("spreadsheet is empty")?
        .iter()
        .map(cell_to_string)
        .collect();
    let records: Vec<Vec<String>> = sheet_rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok((headers, records, 0))
}

fn cell_to_string(cell: &calamine::Data) -> String {
    cell.as_string()
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("{}", cell))
}
