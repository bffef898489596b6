use serde::Serialize;
use std::error::Error;
use tabled::{settings::Style, Table, Tabled};

use crate::types::InstallationTable;

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Export the flat preview table. Its columns are dynamic, so records are
/// written by hand: Unit first, then the observed columns, Notes last.
pub fn write_installation_csv(path: &str, table: &InstallationTable) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = Vec::with_capacity(table.columns.len() + 2);
    header.push("Unit");
    header.extend(table.columns.iter().map(String::as_str));
    header.push("Notes");
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record: Vec<&str> = Vec::with_capacity(header.len());
        record.push(row.unit.as_str());
        for column in &table.columns {
            record.push(row.cells.get(column).unwrap_or(""));
        }
        record.push(row.notes.as_str());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
