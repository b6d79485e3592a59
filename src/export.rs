//! Workbook export: an `.xlsx` file with a combined sheet and one sheet per
//! course section.
//!
//! The workbook is saved to a hidden temporary file next to the target and
//! renamed into place only after the save succeeds, so a failed export never
//! leaves a partial workbook behind.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use calamine::{open_workbook_auto, Data, Range, Reader};
use regex::Regex;
use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info, warn};

use crate::error::{ClasslistError, Result};
use crate::parser::group::Group;
use crate::parser::student::{StudentRecord, COLUMNS};
use crate::parser::term::TermLabel;

pub const WORKBOOK_EXTENSION: &str = "xlsx";
pub const COMBINED_SHEET: &str = "Combined";
/// Optional column carried by workbooks that record the term per row.
pub const TERM_COLUMN: &str = "Term";
pub const MAX_SHEET_NAME: usize = 31;

static UNSAFE_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 _\-]").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Keep letters, digits, spaces, `_` and `-`; collapse whitespace.
pub fn sanitize_stem(s: &str) -> String {
    let kept = UNSAFE_CHARS_RE.replace_all(s.trim(), "");
    WHITESPACE_RE.replace_all(&kept, " ").trim().to_string()
}

/// `"<prefix>_<term>"`, or just the prefix when no term was found.
pub fn output_stem(prefix: &str, term: &TermLabel) -> String {
    let stem = if term.is_known() {
        format!("{}_{}", prefix, term)
    } else {
        prefix.to_string()
    };
    sanitize_stem(&stem)
}

pub fn workbook_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, WORKBOOK_EXTENSION))
}

/// Group key cut to the sheet-name limit (counted in characters).
pub fn sheet_name(key: &str) -> String {
    key.chars().take(MAX_SHEET_NAME).collect()
}

/// Sheet names are compared case-insensitively, as spreadsheet apps do.
fn unique_sheet_name(key: &str, taken: &mut HashSet<String>) -> String {
    let mut name = sheet_name(key);
    let mut n = 2;
    while taken.contains(&name.to_lowercase()) {
        let suffix = format!("~{}", n);
        let base: String = key.chars().take(MAX_SHEET_NAME - suffix.len()).collect();
        name = format!("{}{}", base, suffix);
        n += 1;
    }
    taken.insert(name.to_lowercase());
    name
}

/// One worksheet: a header row followed by text cells.
pub struct Sheet<'a> {
    pub name: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<&'a str>>,
}

impl<'a> Sheet<'a> {
    /// Student records under the standard export columns.
    pub fn students(name: impl Into<String>, records: &'a [StudentRecord]) -> Self {
        Sheet {
            name: name.into(),
            columns: COLUMNS.to_vec(),
            rows: records.iter().map(|r| r.cells().to_vec()).collect(),
        }
    }
}

/// Combined sheet first, then one sheet per group.
pub fn classlist_sheets<'a>(records: &'a [StudentRecord], groups: &'a [Group]) -> Vec<Sheet<'a>> {
    let mut taken = HashSet::from([COMBINED_SHEET.to_lowercase()]);
    let mut sheets = vec![Sheet::students(COMBINED_SHEET, records)];
    for group in groups {
        sheets.push(Sheet::students(
            unique_sheet_name(&group.key, &mut taken),
            &group.records,
        ));
    }
    sheets
}

/// Removes the temporary workbook file unless it was moved into place.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed && self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("could not remove partial workbook {:?}: {}", self.path, e);
            }
        }
    }
}

fn build_workbook(sheets: &[Sheet<'_>]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str())?;
        for (col, title) in sheet.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &header)?;
        }
        for (i, row) in sheet.rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(i as u32 + 1, col as u16, *value)?;
                }
            }
        }
        debug!(sheet = %sheet.name, rows = sheet.rows.len(), "sheet written");
    }
    Ok(workbook)
}

/// Save all sheets and move the finished workbook to `path`, replacing any
/// previous workbook there.
pub fn write_workbook(path: &Path, sheets: &[Sheet<'_>]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut workbook = build_workbook(sheets)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    let mut partial = PartialFile {
        path: parent.join(format!(".{}.partial", file_name)),
        committed: false,
    };
    workbook.save(&partial.path)?;

    fs::rename(&partial.path, path)?;
    partial.committed = true;

    info!("Wrote {} sheets to {:?}", sheets.len(), path);
    Ok(())
}

/// A student row read back from a workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub record: StudentRecord,
    /// Present when the sheet has a `Term` column.
    pub term: Option<String>,
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        // CRNs typed into a spreadsheet come back as floats.
        Data::Float(f) if f.fract() == 0.0 => format!("{:.0}", f),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        _ => String::new(),
    }
}

fn sheet_rows(path: &Path, sheet: &str, range: &Range<Data>) -> Result<Vec<SheetRow>> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let header: Vec<String> = header.iter().map(cell_to_string).collect();
    let position = |column: &str| header.iter().position(|h| h == column);
    let required = |column: &str| {
        position(column).ok_or_else(|| ClasslistError::MissingColumn {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
            column: column.to_string(),
        })
    };

    let first_name = required(COLUMNS[0])?;
    let last_name = required(COLUMNS[1])?;
    let g_number = required(COLUMNS[2])?;
    let email = required(COLUMNS[3])?;
    let class_name = required(COLUMNS[5])?;
    let crn = required(COLUMNS[6])?;
    let personal_email = position(COLUMNS[4]);
    let term = position(TERM_COLUMN);

    let text = |row: &[Data], i: usize| row.get(i).map(cell_to_string).unwrap_or_default();
    let records = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| SheetRow {
            record: StudentRecord {
                first_name: text(row, first_name),
                last_name: text(row, last_name),
                g_number: text(row, g_number),
                institutional_email: text(row, email),
                personal_email: personal_email.map(|i| text(row, i)).unwrap_or_default(),
                class_name: text(row, class_name),
                crn: text(row, crn),
            },
            term: term.map(|i| text(row, i)),
        })
        .collect();
    Ok(records)
}

/// Read every sheet of a workbook, in workbook order.
pub fn read_workbook(path: &Path) -> Result<Vec<(String, Vec<SheetRow>)>> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let rows = sheet_rows(path, &name, &range)?;
        debug!(sheet = %name, rows = rows.len(), "sheet read");
        sheets.push((name, rows));
    }
    Ok(sheets)
}

// ── Tests ──
