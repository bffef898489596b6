// Turning consolidated counts into the strings the printed report shows.

use crate::classify::Fixture;
use crate::types::{ConsolidatedUnit, NotesMap, ReportRow};

/// Formatter output meaning zero installations for a fixture/unit. The
/// report renderer matches on this literal to blank the "existing" column.
pub const NO_TOUCH: &str = "No Touch.";

/// Installation description for a consolidated count.
///
/// Zero reads "No Touch.", one reads the bare flow rating, more than one
/// appends the count: `"1.0 GPM (3)"`.
pub fn describe(count: usize, fixture: Fixture) -> String {
    if count == 0 {
        return NO_TOUCH.to_string();
    }
    let base = fixture.base_rating();
    if count == 1 {
        base.to_string()
    } else {
        format!("{} ({})", base, count)
    }
}

/// The "existing fixture" report cell: the base rating when the unit was
/// touched at all, blank otherwise.
fn existing_label(description: &str, fixture: Fixture) -> String {
    if description == NO_TOUCH {
        String::new()
    } else {
        fixture.base_rating().to_string()
    }
}

/// Sentence-case a free-text note: split on ".", capitalize the first
/// letter of each sentence, lower-case the rest, and re-join with ". ",
/// preserving a trailing period.
pub fn format_note(note: &str) -> String {
    let sentences: Vec<String> = note
        .split('.')
        .filter_map(|sentence| {
            let trimmed = sentence.trim();
            let mut chars = trimmed.chars();
            let first = chars.next()?;
            Some(format!(
                "{}{}",
                first.to_uppercase(),
                chars.as_str().to_lowercase()
            ))
        })
        .collect();
    let mut formatted = sentences.join(". ");
    if note.ends_with('.') {
        formatted.push('.');
    }
    formatted
}

/// Apply descriptions, the existing/installed split, and the notes lookup
/// to each consolidated unit. Input order is preserved; the consolidator
/// already sorted it.
pub fn build_report_rows(units: &[ConsolidatedUnit], notes: &NotesMap) -> Vec<ReportRow> {
    units
        .iter()
        .map(|unit| {
            let kitchen = describe(unit.kitchen_aerator_count, Fixture::Kitchen);
            let bathroom = describe(unit.bathroom_aerator_count, Fixture::Bathroom);
            let shower = describe(unit.shower_head_count, Fixture::Shower);
            ReportRow {
                existing_kitchen: existing_label(&kitchen, Fixture::Kitchen),
                installed_kitchen: kitchen,
                existing_bathroom: existing_label(&bathroom, Fixture::Bathroom),
                installed_bathroom: bathroom,
                existing_shower: existing_label(&shower, Fixture::Shower),
                installed_shower: shower,
                notes: notes.get(&unit.unit).cloned().unwrap_or_default(),
                unit: unit.unit.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_is_no_touch_for_every_fixture() {
        assert_eq!(describe(0, Fixture::Kitchen), "No Touch.");
        assert_eq!(describe(0, Fixture::Bathroom), "No Touch.");
        assert_eq!(describe(0, Fixture::Shower), "No Touch.");
    }

    #[test]
    fn single_install_is_the_bare_rating() {
        assert_eq!(describe(1, Fixture::Shower), "1.75 GPM");
        assert_eq!(describe(1, Fixture::Kitchen), "1.0 GPM");
        assert_eq!(describe(1, Fixture::Bathroom), "1.0 GPM");
    }

    #[test]
    fn multiple_installs_append_the_count() {
        assert_eq!(describe(3, Fixture::Kitchen), "1.0 GPM (3)");
        assert_eq!(describe(2, Fixture::Shower), "1.75 GPM (2)");
    }

    #[test]
    fn report_rows_split_existing_and_installed() {
        let units = vec![
            ConsolidatedUnit {
                unit: "101".to_string(),
                kitchen_aerator_count: 2,
                bathroom_aerator_count: 0,
                shower_head_count: 1,
            },
        ];
        let mut notes = NotesMap::new();
        notes.insert("101".to_string(), "Tenant absent".to_string());

        let rows = build_report_rows(&units, &notes);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.existing_kitchen, "1.0 GPM");
        assert_eq!(row.installed_kitchen, "1.0 GPM (2)");
        assert_eq!(row.existing_bathroom, "");
        assert_eq!(row.installed_bathroom, "No Touch.");
        assert_eq!(row.existing_shower, "1.75 GPM");
        assert_eq!(row.installed_shower, "1.75 GPM");
        assert_eq!(row.notes, "Tenant absent");
    }

    #[test]
    fn missing_notes_render_blank() {
        let units = vec![ConsolidatedUnit {
            unit: "5".to_string(),
            kitchen_aerator_count: 0,
            bathroom_aerator_count: 0,
            shower_head_count: 0,
        }];
        let rows = build_report_rows(&units, &NotesMap::new());
        assert_eq!(rows[0].notes, "");
    }

    #[test]
    fn format_note_sentence_cases() {
        assert_eq!(
            format_note("replaced BOTH aerators. tenant ABSENT."),
            "Replaced both aerators. Tenant absent."
        );
        assert_eq!(format_note("no access"), "No access");
        assert_eq!(format_note(""), "");
    }
}
