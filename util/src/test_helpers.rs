use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a unique temporary directory for on-disk workbooks. The directory is
/// automatically cleaned up when the returned `TempDir` is dropped.
///
/// Keep the returned `TempDir` in scope for as long as you need the files.
pub fn setup_test_dir() -> TempDir {
    TempDir::new().expect("failed to create tempdir")
}

/// Writes `contents` as `<dir>/<workbook>/<sheet>.csv`, creating the workbook
/// directory when needed, and returns the workbook directory.
pub fn write_sheet(dir: &Path, workbook: &str, sheet: &str, contents: &str) -> PathBuf {
    let wb = dir.join(workbook);
    fs::create_dir_all(&wb).expect("failed to create workbook dir");
    fs::write(wb.join(format!("{sheet}.csv")), contents).expect("failed to write sheet");
    wb
}

/// Writes a single-sheet workbook (one CSV file) and returns its path.
pub fn write_csv_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write csv file");
    path
}
