// Entry point and high-level CLI flow.
//
// - Option [1] loads a spreadsheet (CSV or Excel), printing diagnostics.
// - Option [2] consolidates the loaded table and writes the report files.
// - After generating a report, the user can go back to the menu or exit.
mod classify;
mod consolidate;
mod describe;
mod loader;
mod output;
mod types;
mod util;
mod validate;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use types::{NotesMap, RawRow, ReportSummary};

// Simple in-memory app state so we load the spreadsheet once but can
// generate reports multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { table: None }));

struct AppState {
    table: Option<Vec<RawRow>>,
}

/// Print a prompt and read one trimmed line from stdin.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after generating a report.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: decode the spreadsheet into the app state.
fn handle_load() {
    let path = read_line("Spreadsheet path: ");
    if path.is_empty() {
        println!("No path given.\n");
        return;
    }
    match loader::load_table(&path) {
        Ok((table, report)) => {
            println!(
                "Processing spreadsheet... ({} rows read, {} kept, {} blank)",
                util::format_int(report.total_rows as i64),
                util::format_int(report.kept_rows as i64),
                util::format_int(report.blank_rows as i64)
            );
            if report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to decode errors.",
                    util::format_int(report.parse_errors as i64)
                );
            }
            let columns = validate::unique_columns(&table);
            println!("Found {} columns.", util::format_int(columns.len() as i64));
            if let Some(column) = validate::detect_unit_column(&columns) {
                println!("Detected unit column: {}", column);
            }
            println!("");
            let mut state = APP_STATE.lock().unwrap();
            state.table = Some(table);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: consolidate and write the report files.
///
/// This function is intentionally side-effectful:
/// - writes the printable report CSV and a JSON summary,
/// - in manual mode also writes the flat preview CSV,
/// - and prints a Markdown preview of the report to the console.
fn handle_generate_report() {
    let table = {
        let state = APP_STATE.lock().unwrap();
        state.table.clone()
    };
    let Some(table) = table else {
        println!("Error: No data loaded. Please load a spreadsheet first (option 1).\n");
        return;
    };

    let property = read_line("Property name: ");
    let unit_column = read_line("Unit column (blank = automatic): ");
    let notes_input = read_line("Notes columns, comma-separated (blank = none): ");
    let notes_columns: Vec<String> = notes_input
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    println!("\nGenerating report...");

    let hint = if unit_column.is_empty() {
        None
    } else {
        Some(unit_column.as_str())
    };
    let consolidated = consolidate::consolidate(&table, hint);
    if consolidated.is_empty() {
        println!("No units found in the loaded data.\n");
        return;
    }

    // Notes and the flat preview exist only in manual mode; automatic mode
    // has no trusted unit column to stop at.
    let mut notes = NotesMap::new();
    let toilet_cell_count;
    if let Some(column) = hint {
        let preview = consolidate::build_installation_table(&table, column, &notes_columns, &[]);
        toilet_cell_count = preview.toilet_cell_count;
        notes = consolidate::notes_by_unit(&preview);
        let file = "installation_preview.csv";
        if let Err(e) = output::write_installation_csv(file, &preview) {
            eprintln!("Write error: {}", e);
        }
        println!(
            "Flat preview: {} rows exported to {}",
            util::format_int(preview.rows.len() as i64),
            file
        );
    } else {
        if !notes_columns.is_empty() {
            println!("Note: notes columns apply only with an explicit unit column.");
        }
        toilet_cell_count = consolidate::toilet_occurrence_count(&table);
    }

    // The consolidated blob is what downstream pipeline stages exchange.
    if let Err(e) = output::write_json("consolidated_units.json", &consolidated) {
        eprintln!("Write error: {}", e);
    }

    let report_rows = describe::build_report_rows(&consolidated, &notes);
    let report_file = "installation_report.csv";
    if let Err(e) = output::write_csv(report_file, &report_rows) {
        eprintln!("Write error: {}", e);
    }

    let generated = chrono::Local::now().format("%Y-%m-%d").to_string();
    println!("\nDetailed Unit Information");
    if property.is_empty() {
        println!("(generated {})\n", generated);
    } else {
        println!("{} (generated {})\n", property, generated);
    }
    output::preview_table_rows(&report_rows, 10);
    println!("(Full table exported to {})", report_file);
    println!("(Consolidated units exported to consolidated_units.json)\n");

    let summary = ReportSummary {
        property,
        generated,
        total_units: consolidated.len(),
        kitchen_aerators_installed: consolidated.iter().map(|u| u.kitchen_aerator_count).sum(),
        bathroom_aerators_installed: consolidated.iter().map(|u| u.bathroom_aerator_count).sum(),
        shower_heads_installed: consolidated.iter().map(|u| u.shower_head_count).sum(),
        toilet_cell_count,
        toilet_column_count: consolidate::toilet_column_count(&table, hint),
    };
    if let Err(e) = output::write_json("report_summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Summary (report_summary.json): {} units, {} kitchen / {} bathroom / {} shower installs\n",
        util::format_int(summary.total_units as i64),
        util::format_int(summary.kitchen_aerators_installed as i64),
        util::format_int(summary.bathroom_aerators_installed as i64),
        util::format_int(summary.shower_heads_installed as i64)
    );
}

fn main() {
    loop {
        println!("Select an option:");
        println!("[1] Load spreadsheet");
        println!("[2] Generate installation report\n");
        match read_line("Enter choice: ").as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!("");
                handle_generate_report();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
