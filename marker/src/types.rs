//! # Types Module
//!
//! This module defines the core data structures used throughout the marker system:
//! cells and datasets (tabular data already materialized in memory), and the
//! verdicts a comparison produces.

use crate::error::MarkerError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Tokens that dataframe libraries write for a missing value.
const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "NULL", "null", "None", "#N/A",
];

/// Header left behind when a dataframe is exported with its index, e.g. `Unnamed: 0`.
static INDEX_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Unnamed: \d+$").expect("static regex"));

/// A single spreadsheet value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Interpret a raw spreadsheet string: null tokens become [`Cell::Null`],
    /// finite numbers become [`Cell::Number`], anything else is trimmed text.
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if NULL_TOKENS.contains(&trimmed) {
            return Cell::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Total order used for key sorting: nulls, then numbers, then text.
    pub fn key_cmp(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Null, Cell::Null) => Ordering::Equal,
            (Cell::Null, _) => Ordering::Less,
            (_, Cell::Null) => Ordering::Greater,
            (Cell::Number(a), Cell::Number(b)) => a.total_cmp(b),
            (Cell::Number(_), Cell::Text(_)) => Ordering::Less,
            (Cell::Text(_), Cell::Number(_)) => Ordering::Greater,
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{n:.0}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        if n.is_finite() { Cell::Number(n) } else { Cell::Null }
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(f64::from(n))
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}

/// Row and column counts of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

/// A borrowed view of one dataset row, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.cells.get(i))
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

/// An ordered collection of rows over an ordered list of column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with nulls; rows longer than the
    /// header are rejected.
    pub fn push_row(&mut self, mut row: Vec<Cell>) -> Result<(), MarkerError> {
        if row.len() > self.columns.len() {
            return Err(MarkerError::Malformed {
                location: format!("row {}", self.rows.len() + 1),
                reason: format!(
                    "{} values for {} columns",
                    row.len(),
                    self.columns.len()
                ),
            });
        }
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
        Ok(())
    }

    /// Builder-style [`Dataset::push_row`] for literals in tests and derivations.
    pub fn with_row<I, C>(mut self, row: I) -> Result<Self, MarkerError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.push_row(row.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> Shape {
        Shape {
            rows: self.row_count(),
            columns: self.column_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// The cell at `row` in `column`, or `None` when either is out of range.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = &Cell>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().filter_map(move |r| r.get(idx)))
    }

    /// Drop rows whose `key` is null and sort the rest ascending by key.
    ///
    /// The sort is stable, so rows sharing a key keep their relative order.
    pub fn aligned_by(&self, key: &str) -> Result<Dataset, MarkerError> {
        let idx = self
            .column_index(key)
            .ok_or_else(|| MarkerError::MissingColumn {
                dataset: "dataset".to_string(),
                column: key.to_string(),
            })?;

        let mut rows: Vec<Vec<Cell>> = self
            .rows
            .iter()
            .filter(|r| !r[idx].is_null())
            .cloned()
            .collect();
        rows.sort_by(|a, b| a[idx].key_cmp(&b[idx]));

        Ok(Dataset {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Keep only the rows for which `keep` returns true.
    pub fn filter_rows<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&Row<'_>) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|cells| {
                keep(&Row {
                    columns: &self.columns,
                    cells,
                })
            })
            .cloned()
            .collect();
        Dataset {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Project onto `columns`, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<Dataset, MarkerError> {
        let indices = columns
            .iter()
            .map(|c| {
                self.column_index(c).ok_or_else(|| MarkerError::MissingColumn {
                    dataset: "dataset".to_string(),
                    column: c.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Dataset {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        })
    }

    /// Append a column computed from each row.
    pub fn with_computed_column<F>(&self, name: &str, mut compute: F) -> Dataset
    where
        F: FnMut(&Row<'_>) -> Cell,
    {
        let mut columns = self.columns.clone();
        columns.push(name.to_string());
        let rows = self
            .rows
            .iter()
            .map(|cells| {
                let value = compute(&Row {
                    columns: &self.columns,
                    cells,
                });
                let mut out = cells.clone();
                out.push(value);
                out
            })
            .collect();
        Dataset { columns, rows }
    }

    /// Inner join on `on`: left columns followed by the right columns other than
    /// `on`, in left-row order. Null keys never match.
    pub fn inner_join(&self, right: &Dataset, on: &str) -> Result<Dataset, MarkerError> {
        let missing = |dataset: &str| MarkerError::MissingColumn {
            dataset: dataset.to_string(),
            column: on.to_string(),
        };
        let left_idx = self.column_index(on).ok_or_else(|| missing("left dataset"))?;
        let right_idx = right
            .column_index(on)
            .ok_or_else(|| missing("right dataset"))?;

        let mut columns = self.columns.clone();
        columns.extend(
            right
                .columns
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != right_idx)
                .map(|(_, c)| c.clone()),
        );

        let mut rows = Vec::new();
        for left in &self.rows {
            let key = &left[left_idx];
            if key.is_null() {
                continue;
            }
            for other in right.rows.iter().filter(|r| &r[right_idx] == key) {
                let mut joined = left.clone();
                joined.extend(
                    other
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != right_idx)
                        .map(|(_, c)| c.clone()),
                );
                rows.push(joined);
            }
        }

        Ok(Dataset { columns, rows })
    }

    /// Remove columns that are dataframe index artifacts (blank header or
    /// `Unnamed: <n>`), returning the names that were removed.
    pub fn strip_index_columns(&mut self) -> Vec<String> {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !is_index_header(c))
            .collect();
        if keep.iter().all(|k| *k) {
            return Vec::new();
        }

        let removed = self
            .columns
            .iter()
            .zip(&keep)
            .filter(|(_, k)| !**k)
            .map(|(c, _)| c.clone())
            .collect();

        self.columns = retain_by_mask(std::mem::take(&mut self.columns), &keep);
        for row in &mut self.rows {
            *row = retain_by_mask(std::mem::take(row), &keep);
        }
        removed
    }
}

fn is_index_header(header: &str) -> bool {
    header.trim().is_empty() || INDEX_HEADER.is_match(header.trim())
}

fn retain_by_mask<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(item, _)| item)
        .collect()
}

/// The categorical outcome of grading one criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    RowCountMismatch,
    ColumnCountMismatch,
    ContentMismatch,
    /// Membership grading: candidate set strictly contains the reference set.
    TooMany,
    /// Membership grading: candidate set is strictly contained in the reference set.
    TooFew,
    /// Membership grading: neither set contains the other.
    SetMismatch,
    ImportError,
}

impl Verdict {
    pub const ALL: [Verdict; 8] = [
        Verdict::Correct,
        Verdict::RowCountMismatch,
        Verdict::ColumnCountMismatch,
        Verdict::ContentMismatch,
        Verdict::TooMany,
        Verdict::TooFew,
        Verdict::SetMismatch,
        Verdict::ImportError,
    ];

    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }

    /// Snake-case name used in configuration files and JSON output.
    pub fn key(self) -> &'static str {
        match self {
            Verdict::Correct => "correct",
            Verdict::RowCountMismatch => "row_count_mismatch",
            Verdict::ColumnCountMismatch => "column_count_mismatch",
            Verdict::ContentMismatch => "content_mismatch",
            Verdict::TooMany => "too_many",
            Verdict::TooFew => "too_few",
            Verdict::SetMismatch => "set_mismatch",
            Verdict::ImportError => "import_error",
        }
    }

    pub fn from_key(key: &str) -> Option<Verdict> {
        Verdict::ALL.into_iter().find(|v| v.key() == key)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verdict::Correct => "Correct",
            Verdict::RowCountMismatch => "RowCountMismatch",
            Verdict::ColumnCountMismatch => "ColumnCountMismatch",
            Verdict::ContentMismatch => "ContentMismatch",
            Verdict::TooMany => "TooMany",
            Verdict::TooFew => "TooFew",
            Verdict::SetMismatch => "SetMismatch",
            Verdict::ImportError => "ImportError",
        };
        f.write_str(name)
    }
}

/// A verdict together with the diagnostic note shown to the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub verdict: Verdict,
    pub note: String,
}

impl Grade {
    pub fn correct() -> Self {
        Grade {
            verdict: Verdict::Correct,
            note: String::new(),
        }
    }
}
