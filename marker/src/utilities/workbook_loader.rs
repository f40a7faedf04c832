//!
//! Workbook Loader Utility
//!
//! This module loads spreadsheet workbooks into [`Dataset`]s and writes datasets back
//! out as CSV sheets.
//!
//! # Workbook layout
//!
//! - A **directory** is a multi-sheet workbook: every `<sheet>.csv` inside it is one sheet.
//! - A single **CSV file** is a one-sheet workbook; its only sheet answers any sheet request.
//!
//! # Error Handling
//!
//! The specific cause (full path, byte counts, parser message) is logged with
//! `tracing::error!`; the returned [`MarkerError`] stays short so it can be shown in
//! a report next to the student's results.

use crate::error::MarkerError;
use crate::types::{Cell, Dataset};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Maximum allowed size for a single sheet.
const MAX_SHEET_SIZE: u64 = 32 * 1024 * 1024; // 32MB

const SHEET_EXTENSION: &str = "csv";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
    Directory,
    SingleSheet,
}

/// An opened workbook. Opening only checks that the path exists; sheets are read
/// lazily by [`Workbook::sheet`].
#[derive(Debug, Clone)]
pub struct Workbook {
    path: PathBuf,
    layout: Layout,
}

impl Workbook {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MarkerError> {
        let path = path.as_ref();
        if path.is_dir() {
            return Ok(Self {
                path: path.to_path_buf(),
                layout: Layout::Directory,
            });
        }
        check_file(path, Some(MAX_SHEET_SIZE))?;
        Ok(Self {
            path: path.to_path_buf(),
            layout: Layout::SingleSheet,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sheet names in sorted order. A single-file workbook reports its file stem.
    pub fn sheet_names(&self) -> Result<Vec<String>, MarkerError> {
        match self.layout {
            Layout::SingleSheet => Ok(vec![file_stem(&self.path)]),
            Layout::Directory => Ok(self
                .sheet_files()?
                .into_iter()
                .map(|(name, _)| name)
                .collect()),
        }
    }

    /// Read one sheet. `None` selects the first sheet (sorted by name).
    pub fn sheet(&self, name: Option<&str>) -> Result<Dataset, MarkerError> {
        let path = match (&self.layout, name) {
            (Layout::SingleSheet, _) => self.path.clone(),
            (Layout::Directory, Some(name)) => self.sheet_path(name)?,
            (Layout::Directory, None) => {
                let (_, first) = self.sheet_files()?.into_iter().next().ok_or_else(|| {
                    error!("Workbook has no sheets: {}", self.path.display());
                    MarkerError::SheetNotFound {
                        workbook: self.path.clone(),
                        sheet: "<first sheet>".to_string(),
                    }
                })?;
                first
            }
        };
        debug!(workbook = %self.path.display(), sheet = ?name, "reading sheet");
        read_csv(&path)
    }

    /// `(sheet name, file path)` for every CSV file in a directory workbook, sorted by name.
    fn sheet_files(&self) -> Result<Vec<(String, PathBuf)>, MarkerError> {
        let mut sheets = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            let is_sheet = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(SHEET_EXTENSION));
            if is_sheet {
                sheets.push((file_stem(&path), path));
            }
        }
        sheets.sort();
        Ok(sheets)
    }

    /// Exact sheet name first, then a case-insensitive match on sheet name and extension.
    fn sheet_path(&self, name: &str) -> Result<PathBuf, MarkerError> {
        let sheets = self.sheet_files()?;
        let matched = sheets
            .iter()
            .find(|(stem, _)| stem == name)
            .or_else(|| sheets.iter().find(|(stem, _)| stem.eq_ignore_ascii_case(name)));
        match matched {
            Some((_, path)) => Ok(path.clone()),
            None => {
                error!(
                    "Sheet `{}` not found in workbook {}",
                    name,
                    self.path.display()
                );
                Err(MarkerError::SheetNotFound {
                    workbook: self.path.clone(),
                    sheet: name.to_string(),
                })
            }
        }
    }
}

/// Checks that a file exists, is a file, and (optionally) does not exceed a maximum size.
fn check_file(path: &Path, max_size: Option<u64>) -> Result<(), MarkerError> {
    if !path.exists() {
        error!("File not found: {}", path.display());
        return Err(MarkerError::FileNotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        error!("Not a file: {}", path.display());
        return Err(MarkerError::Malformed {
            location: path.display().to_string(),
            reason: "not a regular file".to_string(),
        });
    }

    let metadata = fs::metadata(path).map_err(|e| {
        error!("File unreadable: {} - {}", path.display(), e);
        MarkerError::Io(e)
    })?;

    if let Some(max) = max_size {
        if metadata.len() > max {
            error!(
                "File too large: {} ({} bytes, max {} bytes)",
                path.display(),
                metadata.len(),
                max
            );
            return Err(MarkerError::Malformed {
                location: path.display().to_string(),
                reason: "file too large".to_string(),
            });
        }
    }

    Ok(())
}

/// Read one CSV sheet. The first record is the header row.
pub fn read_csv(path: &Path) -> Result<Dataset, MarkerError> {
    check_file(path, Some(MAX_SHEET_SIZE))?;

    let located = |err: MarkerError| match err {
        MarkerError::Malformed { location, reason } => {
            error!("Malformed sheet {} at {}: {}", path.display(), location, reason);
            MarkerError::Malformed {
                location: format!("{} ({location})", path.display()),
                reason,
            }
        }
        other => other,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| located(e.into()))?;

    let headers = reader.headers().map_err(|e| located(e.into()))?.clone();
    if headers.is_empty() {
        return Err(located(MarkerError::Malformed {
            location: "line 1".to_string(),
            reason: "missing header row".to_string(),
        }));
    }

    let mut dataset = Dataset::new(
        headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string()),
    );
    for record in reader.records() {
        let record = record.map_err(|e| located(e.into()))?;
        // Trailing empty fields from spreadsheet exports are padding, not data.
        let mut cells: Vec<Cell> = record.iter().map(Cell::parse).collect();
        while cells.len() > dataset.column_count() && cells.last().is_some_and(Cell::is_null) {
            cells.pop();
        }
        dataset.push_row(cells).map_err(located)?;
    }

    Ok(dataset)
}

/// Write a dataset as a CSV sheet, creating parent directories as needed.
pub fn write_csv(path: &Path, dataset: &Dataset) -> Result<(), MarkerError> {
    util::paths::ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(dataset.columns())?;
    for row in dataset.rows() {
        writer.write_record(row.cells().iter().map(|c| c.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use util::test_helpers::{setup_test_dir, write_csv_file, write_sheet};

    const CONTACTS: &str = "ID,PhoneNo,Address\n2,555-0200,2 Oak St\n1,555-0100,1 Main St\n";

    #[test]
    fn reads_sheet_from_directory_workbook() {
        let dir = setup_test_dir();
        let wb = write_sheet(dir.path(), "BMI_Solution_Excel", "Criteria_1", CONTACTS);

        let workbook = Workbook::open(&wb).unwrap();
        let sheet = workbook.sheet(Some("Criteria_1")).unwrap();
        assert_eq!(sheet.columns(), ["ID", "PhoneNo", "Address"]);
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.cell(0, "ID"), Some(&Cell::Number(2.0)));
    }

    #[test]
    fn sheet_lookup_ignores_case() {
        let dir = setup_test_dir();
        let wb = write_sheet(dir.path(), "wb", "Contact Info", CONTACTS);
        let workbook = Workbook::open(&wb).unwrap();
        assert!(workbook.sheet(Some("contact info")).is_ok());
    }

    #[test]
    fn uppercase_extension_resolves_to_the_real_file() {
        let dir = setup_test_dir();
        let wb = dir.path().join("wb");
        fs::create_dir_all(&wb).unwrap();
        fs::write(wb.join("Criteria_1.CSV"), CONTACTS).unwrap();

        let workbook = Workbook::open(&wb).unwrap();
        assert_eq!(workbook.sheet_names().unwrap(), vec!["Criteria_1"]);
        assert_eq!(workbook.sheet(Some("Criteria_1")).unwrap().row_count(), 2);
        assert_eq!(workbook.sheet(Some("criteria_1")).unwrap().row_count(), 2);
        assert_eq!(workbook.sheet(None).unwrap().row_count(), 2);
    }

    #[test]
    fn missing_workbook_is_file_not_found() {
        let dir = setup_test_dir();
        let err = Workbook::open(dir.path().join("BMI_Solution_Python")).unwrap_err();
        assert!(matches!(err, MarkerError::FileNotFound(_)));
    }

    #[test]
    fn missing_sheet_is_sheet_not_found() {
        let dir = setup_test_dir();
        let wb = write_sheet(dir.path(), "wb", "Criteria_1", CONTACTS);
        let err = Workbook::open(&wb).unwrap().sheet(Some("Criteria_3")).unwrap_err();
        assert!(matches!(err, MarkerError::SheetNotFound { ref sheet, .. } if sheet == "Criteria_3"));
    }

    #[test]
    fn single_file_answers_any_sheet() {
        let dir = setup_test_dir();
        let path = write_csv_file(dir.path(), "FY2019_PhenytoinAERS.csv", "prod_ai\nPHENYTOIN\n");
        let workbook = Workbook::open(&path).unwrap();
        assert_eq!(workbook.sheet_names().unwrap(), vec!["FY2019_PhenytoinAERS"]);
        assert_eq!(workbook.sheet(Some("anything")).unwrap().row_count(), 1);
        assert_eq!(workbook.sheet(None).unwrap().row_count(), 1);
    }

    #[test]
    fn first_sheet_is_used_when_none_requested() {
        let dir = setup_test_dir();
        write_sheet(dir.path(), "wb", "B", "x\n1\n");
        let wb = write_sheet(dir.path(), "wb", "A", "y\n1\n2\n");
        let sheet = Workbook::open(&wb).unwrap().sheet(None).unwrap();
        assert_eq!(sheet.columns(), ["y"]);
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let dir = setup_test_dir();
        let path = write_csv_file(dir.path(), "bad.csv", "ID,PhoneNo\n1,555,extra\n");
        let err = read_csv(&path).unwrap_err();
        assert!(matches!(err, MarkerError::Malformed { .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn trailing_empty_fields_are_tolerated() {
        let dir = setup_test_dir();
        let path = write_csv_file(dir.path(), "pad.csv", "ID,PhoneNo\n1,555,,\n");
        let ds = read_csv(&path).unwrap();
        assert_eq!(ds.row_count(), 1);
    }

    #[test]
    fn empty_file_is_malformed() {
        let dir = setup_test_dir();
        let path = write_csv_file(dir.path(), "empty.csv", "");
        assert!(matches!(read_csv(&path), Err(MarkerError::Malformed { .. })));
    }

    #[test]
    fn write_then_read_preserves_values() {
        let dir = setup_test_dir();
        let original = Dataset::new(["ID", "BMI"])
            .with_row([Cell::from(1), Cell::from(31.25)])
            .unwrap()
            .with_row([Cell::from(2), Cell::Null])
            .unwrap();
        let path = dir.path().join("out/nested/sheet.csv");
        write_csv(&path, &original).unwrap();
        assert_eq!(read_csv(&path).unwrap(), original);
    }
}
