use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Free-text notes keyed by unit identifier, consumed read-only when the
/// report rows are built.
pub type NotesMap = HashMap<String, String>;

/// One spreadsheet row: column name mapped to the raw cell text.
///
/// Cells are kept as an ordered list instead of a map because the unit-column
/// fallback scan walks keys in header order. Rows are small, so lookups are a
/// linear scan.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Build a row from literal pairs.
    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut row = Self::new();
        for (column, value) in pairs {
            row.insert(*column, *value);
        }
        row
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.push((column.into(), value.into()));
    }

    /// Raw text of the named cell. Sparse/missing keys read as `None`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// True when every cell is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.trim().is_empty())
    }
}

/// One summary record per distinct unit. Counts are sizes of per-category
/// column-name sets, so a repeated signal in the same column counts once.
///
/// Field names serialize in the camelCase form the host stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedUnit {
    pub unit: String,
    #[serde(rename = "kitchenAeratorCount")]
    pub kitchen_aerator_count: usize,
    #[serde(rename = "bathroomAeratorCount")]
    pub bathroom_aerator_count: usize,
    #[serde(rename = "showerHeadCount")]
    pub shower_head_count: usize,
}

/// A user-picked `(row, column)` cell whose value becomes a note annotation.
/// The row index refers to the raw table order, before any sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCell {
    #[serde(rename = "rowIndex")]
    pub row_index: usize,
    pub column: String,
}

/// One row of the flat preview/export table: the unit value, the original
/// cells, and the combined note synthesized from notes columns and selected
/// cells.
#[derive(Debug, Clone)]
pub struct InstallationRow {
    pub unit: String,
    pub cells: RawRow,
    pub notes: String,
}

/// The manual-mode scan output: sorted rows, the column list for export, and
/// the per-cell toilet occurrence count observed during the scan.
#[derive(Debug, Clone)]
pub struct InstallationTable {
    pub columns: Vec<String>,
    pub rows: Vec<InstallationRow>,
    pub toilet_cell_count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ReportRow {
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "ExistingKitchenAerator")]
    #[tabled(rename = "Existing Kitchen Aerator")]
    pub existing_kitchen: String,
    #[serde(rename = "InstalledKitchenAerator")]
    #[tabled(rename = "Installed Kitchen Aerator")]
    pub installed_kitchen: String,
    #[serde(rename = "ExistingBathroomAerator")]
    #[tabled(rename = "Existing Bathroom Aerator")]
    pub existing_bathroom: String,
    #[serde(rename = "InstalledBathroomAerator")]
    #[tabled(rename = "Installed Bathroom Aerator")]
    pub installed_bathroom: String,
    #[serde(rename = "ExistingShower")]
    #[tabled(rename = "Existing Shower")]
    pub existing_shower: String,
    #[serde(rename = "InstalledShower")]
    #[tabled(rename = "Installed Shower")]
    pub installed_shower: String,
    #[serde(rename = "Notes")]
    #[tabled(rename = "Notes")]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub property: String,
    pub generated: String,
    pub total_units: usize,
    pub kitchen_aerators_installed: usize,
    pub bathroom_aerators_installed: usize,
    pub shower_heads_installed: usize,
    pub toilet_cell_count: usize,
    pub toilet_column_count: usize,
}
