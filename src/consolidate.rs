// The consolidation engine: group raw rows by unit, classify every cell,
// and accumulate per-category counts as sets of column names.

use std::collections::{HashMap, HashSet};

use crate::classify::{self, Fixture};
use crate::describe::format_note;
use crate::types::{
    ConsolidatedUnit, InstallationRow, InstallationTable, NotesMap, RawRow, SelectedCell,
};
use crate::util::compare_units;
use crate::validate::{scan_units, unique_columns, EndPolicy};

/// Consolidate raw rows into one record per distinct unit.
///
/// With `unit_column` the identifier is read from that cell (manual mode);
/// without it, row validation resolves and filters identifiers
/// automatically. Counts are per-category *column-name set* sizes: repeated
/// installed signals in the same column across a unit's rows count once,
/// signals in different columns of the same category count separately.
/// Output is sorted by the unit comparator.
pub fn consolidate(rows: &[RawRow], unit_column: Option<&str>) -> Vec<ConsolidatedUnit> {
    // Vec preserves row order within each group for downstream notes use.
    let mut groups: HashMap<String, Vec<&RawRow>> = HashMap::new();
    for (index, unit) in scan_units(rows, unit_column, EndPolicy::SkipAggregates) {
        groups.entry(unit).or_default().push(&rows[index]);
    }

    let mut consolidated: Vec<ConsolidatedUnit> = groups
        .into_iter()
        .map(|(unit, group)| {
            let mut kitchen_columns: HashSet<&str> = HashSet::new();
            let mut bathroom_columns: HashSet<&str> = HashSet::new();
            let mut shower_columns: HashSet<&str> = HashSet::new();
            for row in group {
                for (column, value) in row.iter() {
                    if !classify::is_installed(value) {
                        continue;
                    }
                    match classify::classify(column) {
                        Some(Fixture::Kitchen) => {
                            kitchen_columns.insert(column);
                        }
                        Some(Fixture::Bathroom) => {
                            bathroom_columns.insert(column);
                        }
                        Some(Fixture::Shower) => {
                            shower_columns.insert(column);
                        }
                        None => {}
                    }
                }
            }
            ConsolidatedUnit {
                unit,
                kitchen_aerator_count: kitchen_columns.len(),
                bathroom_aerator_count: bathroom_columns.len(),
                shower_head_count: shower_columns.len(),
            }
        })
        .collect();

    consolidated.sort_by(|a, b| compare_units(&a.unit, &b.unit));
    consolidated
}

/// Build the flat preview/export table for a hand-picked unit column.
///
/// Rows are scanned with the stop-at-blank policy: the first row whose unit
/// cell is blank ends the table, even if later rows hold valid units. Each
/// surviving row carries a combined note from the chosen notes columns
/// (sentence-cased) plus any selected-cell annotations targeting its raw
/// row index.
pub fn build_installation_table(
    rows: &[RawRow],
    unit_column: &str,
    notes_columns: &[String],
    selected_cells: &[SelectedCell],
) -> InstallationTable {
    let columns = unique_columns(rows);
    // The occurrence metric deliberately runs over the full table, not the
    // truncated scan.
    let toilet_cell_count = toilet_occurrence_count(rows);

    let mut table_rows: Vec<InstallationRow> = scan_units(
        rows,
        Some(unit_column),
        EndPolicy::StopAtBlank,
    )
    .into_iter()
    .map(|(index, unit)| {
        let row = &rows[index];
        let mut combined = String::new();
        for column in notes_columns {
            if let Some(value) = row.get(column) {
                let value = value.trim();
                if !value.is_empty() {
                    combined.push_str(&format_note(value));
                    combined.push(' ');
                }
            }
        }
        for cell in selected_cells.iter().filter(|cell| cell.row_index == index) {
            let value = row.get(&cell.column).unwrap_or("").trim();
            combined.push_str(&cell_note(&unit, &cell.column, value));
            combined.push(' ');
        }
        InstallationRow {
            notes: combined.trim().to_string(),
            cells: row.clone(),
            unit,
        }
    })
    .collect();

    table_rows.sort_by(|a, b| compare_units(&a.unit, &b.unit));
    InstallationTable {
        columns,
        rows: table_rows,
        toilet_cell_count,
    }
}

/// Annotation text for a user-selected cell.
pub fn cell_note(unit: &str, column: &str, value: &str) -> String {
    format!("Unit {}: {} = {}", unit, column, value)
}

/// Notes map keyed by unit, from the installation table. The first row of a
/// unit with a non-empty note wins.
pub fn notes_by_unit(table: &InstallationTable) -> NotesMap {
    let mut notes = NotesMap::new();
    for row in &table.rows {
        if row.notes.is_empty() {
            continue;
        }
        notes
            .entry(row.unit.clone())
            .or_insert_with(|| row.notes.clone());
    }
    notes
}

/// Per-cell toilet metric: toilet columns are detected from the first row's
/// keys, and every matching cell across all rows counts once per cell.
pub fn toilet_occurrence_count(rows: &[RawRow]) -> usize {
    let Some(first) = rows.first() else {
        return 0;
    };
    let toilet_columns: Vec<&str> = first
        .columns()
        .filter(|column| classify::is_toilet_column(column))
        .collect();

    let mut count = 0;
    for row in rows {
        for column in &toilet_columns {
            if row
                .get(column)
                .map(classify::is_toilet_installed)
                .unwrap_or(false)
            {
                count += 1;
            }
        }
    }
    count
}

/// Per-unit per-column toilet metric: the same set-based dedup as fixture
/// consolidation, summed across units. Diverges from
/// `toilet_occurrence_count` whenever a unit repeats a signal in one column.
pub fn toilet_column_count(rows: &[RawRow], unit_column: Option<&str>) -> usize {
    let mut groups: HashMap<String, HashSet<&str>> = HashMap::new();
    for (index, unit) in scan_units(rows, unit_column, EndPolicy::SkipAggregates) {
        let columns = groups.entry(unit).or_default();
        for (column, value) in rows[index].iter() {
            if classify::is_toilet_column(column) && classify::is_toilet_installed(value) {
                columns.insert(column);
            }
        }
    }
    groups.values().map(HashSet::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<RawRow> {
        vec![
            RawRow::from_pairs(&[
                ("Unit", "101"),
                ("Kitchen Faucet", "installed"),
                ("Bathroom Faucet", "no"),
            ]),
            RawRow::from_pairs(&[("Unit", "101"), ("Kitchen Faucet", "yes")]),
            RawRow::from_pairs(&[("Unit", "102"), ("Shower Head", "2")]),
        ]
    }

    #[test]
    fn repeated_signals_in_one_column_count_once() {
        let consolidated = consolidate(&sample_rows(), None);
        assert_eq!(
            consolidated,
            vec![
                ConsolidatedUnit {
                    unit: "101".to_string(),
                    kitchen_aerator_count: 1,
                    bathroom_aerator_count: 0,
                    shower_head_count: 0,
                },
                ConsolidatedUnit {
                    unit: "102".to_string(),
                    kitchen_aerator_count: 0,
                    bathroom_aerator_count: 0,
                    shower_head_count: 1,
                },
            ]
        );
    }

    #[test]
    fn distinct_columns_in_one_category_count_separately() {
        let rows = vec![
            RawRow::from_pairs(&[
                ("Unit", "7"),
                ("Master Bathroom", "male"),
                ("Guest Bath", "female"),
                ("Hall Bath", "no"),
            ]),
        ];
        let consolidated = consolidate(&rows, None);
        assert_eq!(consolidated[0].bathroom_aerator_count, 2);
    }

    #[test]
    fn consolidation_is_idempotent() {
        let rows = sample_rows();
        assert_eq!(consolidate(&rows, None), consolidate(&rows, None));
    }

    #[test]
    fn aggregate_rows_are_excluded_without_terminating() {
        let rows = vec![
            RawRow::from_pairs(&[("Unit", "101"), ("Kitchen", "1")]),
            RawRow::from_pairs(&[("Unit", "Subtotal"), ("Kitchen", "1")]),
            RawRow::from_pairs(&[("Unit", "102"), ("Kitchen", "1")]),
        ];
        let consolidated = consolidate(&rows, None);
        let units: Vec<&str> = consolidated.iter().map(|u| u.unit.as_str()).collect();
        assert_eq!(units, vec!["101", "102"]);
    }

    #[test]
    fn manual_mode_trusts_the_picked_column() {
        // No exclusion list in manual mode; blank cells are skipped, not
        // terminal, for consolidation.
        let rows = vec![
            RawRow::from_pairs(&[("Apt #", "Totals"), ("Kitchen", "1")]),
            RawRow::from_pairs(&[("Apt #", ""), ("Kitchen", "1")]),
            RawRow::from_pairs(&[("Apt #", "3"), ("Kitchen", "1")]),
        ];
        let consolidated = consolidate(&rows, Some("Apt #"));
        let units: Vec<&str> = consolidated.iter().map(|u| u.unit.as_str()).collect();
        assert_eq!(units, vec!["3", "Totals"]);
    }

    #[test]
    fn output_is_sorted_numerically_then_naturally() {
        let rows = vec![
            RawRow::from_pairs(&[("Unit", "Penthouse")]),
            RawRow::from_pairs(&[("Unit", "102A")]),
            RawRow::from_pairs(&[("Unit", "2")]),
            RawRow::from_pairs(&[("Unit", "10")]),
        ];
        let consolidated = consolidate(&rows, None);
        let units: Vec<&str> = consolidated.iter().map(|u| u.unit.as_str()).collect();
        assert_eq!(units, vec!["2", "10", "102A", "Penthouse"]);
    }

    #[test]
    fn no_usable_units_is_an_empty_result() {
        let rows = vec![RawRow::from_pairs(&[("Kitchen", "1"), ("Notes", "x")])];
        assert!(consolidate(&rows, None).is_empty());
        assert!(consolidate(&[], None).is_empty());
    }

    #[test]
    fn installation_table_stops_at_first_blank_unit() {
        let rows = vec![
            RawRow::from_pairs(&[("Unit", "201"), ("Notes", "ok")]),
            RawRow::from_pairs(&[("Unit", ""), ("Notes", "footer")]),
            RawRow::from_pairs(&[("Unit", "202"), ("Notes", "late")]),
        ];
        let table = build_installation_table(&rows, "Unit", &[], &[]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].unit, "201");
    }

    #[test]
    fn installation_table_combines_notes_columns_and_selected_cells() {
        let rows = vec![
            RawRow::from_pairs(&[
                ("Unit", "101"),
                ("Field Notes", "tenant absent. left tag."),
                ("Kitchen", "1"),
            ]),
            RawRow::from_pairs(&[("Unit", "102"), ("Field Notes", ""), ("Kitchen", "2 GPM")]),
        ];
        let notes_columns = vec!["Field Notes".to_string()];
        let selected = vec![SelectedCell {
            row_index: 1,
            column: "Kitchen".to_string(),
        }];
        let table = build_installation_table(&rows, "Unit", &notes_columns, &selected);

        assert_eq!(table.rows[0].notes, "Tenant absent. Left tag.");
        assert_eq!(table.rows[1].notes, "Unit 102: Kitchen = 2 GPM");
    }

    #[test]
    fn installation_table_sorts_rows_by_unit() {
        let rows = vec![
            RawRow::from_pairs(&[("Unit", "10")]),
            RawRow::from_pairs(&[("Unit", "2")]),
        ];
        let table = build_installation_table(&rows, "Unit", &[], &[]);
        let units: Vec<&str> = table.rows.iter().map(|r| r.unit.as_str()).collect();
        assert_eq!(units, vec!["2", "10"]);
    }

    #[test]
    fn notes_map_takes_first_non_empty_note_per_unit() {
        let rows = vec![
            RawRow::from_pairs(&[("Unit", "5"), ("Field Notes", "")]),
            RawRow::from_pairs(&[("Unit", "5"), ("Field Notes", "second visit")]),
        ];
        let table =
            build_installation_table(&rows, "Unit", &["Field Notes".to_string()], &[]);
        let notes = notes_by_unit(&table);
        assert_eq!(notes.get("5").map(String::as_str), Some("Second visit"));
    }

    #[test]
    fn consolidated_units_serialize_with_host_field_names() {
        let unit = ConsolidatedUnit {
            unit: "101".to_string(),
            kitchen_aerator_count: 1,
            bathroom_aerator_count: 0,
            shower_head_count: 2,
        };
        let json = serde_json::to_string(&unit).unwrap();
        assert!(json.contains("\"kitchenAeratorCount\":1"));
        assert!(json.contains("\"bathroomAeratorCount\":0"));
        assert!(json.contains("\"showerHeadCount\":2"));
    }

    #[test]
    fn toilet_metrics_diverge_on_repeated_signals() {
        let rows = vec![
            RawRow::from_pairs(&[("Unit", "1"), ("Toilet", "1")]),
            RawRow::from_pairs(&[("Unit", "1"), ("Toilet", "yes")]),
            RawRow::from_pairs(&[("Unit", "2"), ("Toilet", "x")]),
        ];
        // Occurrence metric counts every matching cell.
        assert_eq!(toilet_occurrence_count(&rows), 3);
        // Column metric dedups per unit per column.
        assert_eq!(toilet_column_count(&rows, None), 2);
    }

    #[test]
    fn toilet_occurrence_uses_first_row_columns_and_literal_vocabulary() {
        let rows = vec![
            RawRow::from_pairs(&[("Unit", "1"), ("WC", "2")]),
            RawRow::from_pairs(&[("Unit", "2"), ("WC", "installed")]),
        ];
        // "2" is fixture vocabulary, not toilet vocabulary.
        assert_eq!(toilet_occurrence_count(&rows), 1);
        assert_eq!(toilet_occurrence_count(&[]), 0);
    }
}
