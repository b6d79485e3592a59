//! Adds/drops report between two exported class list workbooks.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::export::{self, Sheet, SheetRow, COMBINED_SHEET, TERM_COLUMN};
use crate::parser::student::COLUMNS;

pub const CHANGES_STEM: &str = "students_changes";
pub const ADDED_SHEET: &str = "Added Students";
pub const DROPPED_SHEET: &str = "Dropped Students";

#[derive(Debug, Default)]
pub struct ChangeReport {
    pub added: Vec<SheetRow>,
    pub dropped: Vec<SheetRow>,
}

/// Rows in `from` whose G number is absent from `other`.
fn missing_from<'a>(from: &'a [SheetRow], other: &[SheetRow]) -> Vec<&'a SheetRow> {
    let present: HashSet<&str> = other.iter().map(|r| r.record.g_number.as_str()).collect();
    from.iter()
        .filter(|r| !present.contains(r.record.g_number.as_str()))
        .collect()
}

/// Keep the first row per (G number, CRN).
fn dedup(rows: Vec<SheetRow>) -> Vec<SheetRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| seen.insert((r.record.g_number.clone(), r.record.crn.clone())))
        .collect()
}

/// Compare section sheets present in both workbooks. Sections found in only
/// one workbook and the combined sheet are skipped.
pub fn compare_sheets(
    first: &[(String, Vec<SheetRow>)],
    second: &[(String, Vec<SheetRow>)],
) -> ChangeReport {
    let second_by_name: HashMap<&str, &[SheetRow]> = second
        .iter()
        .map(|(name, rows)| (name.as_str(), rows.as_slice()))
        .collect();

    let mut added = Vec::new();
    let mut dropped = Vec::new();

    for (name, first_rows) in first {
        if name == COMBINED_SHEET {
            continue;
        }
        let Some(second_rows) = second_by_name.get(name.as_str()) else {
            debug!(sheet = %name, "section missing from second workbook, skipped");
            continue;
        };
        added.extend(missing_from(second_rows, first_rows).into_iter().cloned());
        dropped.extend(missing_from(first_rows, second_rows).into_iter().cloned());
    }

    ChangeReport {
        added: dedup(added),
        dropped: dedup(dropped),
    }
}

/// Report sheet; a `Term` column goes before `CRN` when the inputs had one.
fn change_sheet<'a>(name: &str, rows: &'a [SheetRow], with_term: bool) -> Sheet<'a> {
    let crn_at = COLUMNS.len() - 1;
    let mut columns = COLUMNS.to_vec();
    if with_term {
        columns.insert(crn_at, TERM_COLUMN);
    }
    let rows = rows
        .iter()
        .map(|row| {
            let mut cells = row.record.cells().to_vec();
            if with_term {
                cells.insert(crn_at, row.term.as_deref().unwrap_or_default());
            }
            cells
        })
        .collect();
    Sheet {
        name: name.to_string(),
        columns,
        rows,
    }
}

/// Read both workbooks, compare them and write the report workbook into
/// `out_dir`.
pub fn run(first: &Path, second: &Path, out_dir: &Path) -> Result<(ChangeReport, PathBuf)> {
    let first_sheets = export::read_workbook(first)?;
    let second_sheets = export::read_workbook(second)?;
    let report = compare_sheets(&first_sheets, &second_sheets);

    let with_term = report
        .added
        .iter()
        .chain(&report.dropped)
        .any(|r| r.term.is_some());

    let path = export::workbook_path(out_dir, CHANGES_STEM);
    export::write_workbook(
        &path,
        &[
            change_sheet(ADDED_SHEET, &report.added, with_term),
            change_sheet(DROPPED_SHEET, &report.dropped, with_term),
        ],
    )?;

    info!(
        added = report.added.len(),
        dropped = report.dropped.len(),
        "Comparison written to {:?}",
        path
    );
    Ok((report, path))
}

// ── Tests ──
