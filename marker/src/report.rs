//! # Grading Report Module
//!
//! This module defines the serializable output of a grading run.
//!
//! ## Overview
//!
//! The main types are:
//! - [`CriterionResult`]: verdict, note and diagnostics for one criterion of one submission.
//! - [`ResultsTable`]: every criterion result for one submission, written as one CSV sheet
//!   with the columns `criterion`, `verdict`, `note`.
//! - [`GradingReport`]: the whole run (reference characteristics plus one table per
//!   submission), written as JSON.
//!
//! ## JSON Output Example
//!
//! ```json
//! {
//!   "assignment": "BMI Risk Factors",
//!   "created_at": "2026-10-19T12:00:00Z",
//!   "references": [
//!     { "criterion": "Criteria_1", "shape": { "rows": 12, "columns": 3 } }
//!   ],
//!   "submissions": [
//!     {
//!       "submission": "Excel Submission",
//!       "status": "graded",
//!       "score": 100,
//!       "results": [
//!         { "criterion": "Criteria_1", "verdict": "correct", "note": "" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::error::MarkerError;
use crate::scorer::compute_overall_score;
use crate::traits::comparator::Comparison;
use crate::types::{Cell, Dataset, Grade, Shape, Verdict};
use crate::utilities::workbook_loader::write_csv;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use util::paths::{ensure_dir, sanitize_file_stem};

/// The outcome of grading one criterion of one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionResult {
    pub criterion: String,
    pub verdict: Verdict,
    pub note: String,
    /// Typed load-failure text, kept for instructors when the verdict is `ImportError`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Informational remark that does not affect the verdict (e.g. an exported index column).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub remark: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

impl CriterionResult {
    pub fn graded(criterion: impl Into<String>, grade: Grade, comparison: Comparison) -> Self {
        Self {
            criterion: criterion.into(),
            verdict: grade.verdict,
            note: grade.note,
            detail: None,
            remark: String::new(),
            comparison: Some(comparison),
        }
    }

    pub fn import_error(
        criterion: impl Into<String>,
        note: impl Into<String>,
        detail: &MarkerError,
    ) -> Self {
        Self {
            criterion: criterion.into(),
            verdict: Verdict::ImportError,
            note: note.into(),
            detail: Some(detail.to_string()),
            remark: String::new(),
            comparison: None,
        }
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Graded,
    /// Optional submission that was not found on disk.
    Skipped,
}

/// All criterion results for one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsTable {
    pub submission: String,
    pub path: PathBuf,
    pub status: SubmissionStatus,
    /// Percentage of criteria graded `Correct`.
    pub score: u32,
    pub results: Vec<CriterionResult>,
}

impl ResultsTable {
    pub fn graded(submission: impl Into<String>, path: &Path, results: Vec<CriterionResult>) -> Self {
        Self {
            submission: submission.into(),
            path: path.to_path_buf(),
            status: SubmissionStatus::Graded,
            score: compute_overall_score(&results),
            results,
        }
    }

    pub fn skipped(submission: impl Into<String>, path: &Path) -> Self {
        Self {
            submission: submission.into(),
            path: path.to_path_buf(),
            status: SubmissionStatus::Skipped,
            score: 0,
            results: Vec::new(),
        }
    }

    pub fn result(&self, criterion: &str) -> Option<&CriterionResult> {
        self.results.iter().find(|r| r.criterion == criterion)
    }

    /// The table as a dataset: `criterion, verdict, note`, plus `remark` when any
    /// criterion carries one.
    pub fn to_dataset(&self) -> Result<Dataset, MarkerError> {
        let with_remarks = self.results.iter().any(|r| !r.remark.is_empty());
        let mut columns = vec!["criterion", "verdict", "note"];
        if with_remarks {
            columns.push("remark");
        }

        let mut table = Dataset::new(columns);
        for result in &self.results {
            let mut row = vec![
                Cell::Text(result.criterion.clone()),
                Cell::Text(result.verdict.to_string()),
                Cell::Text(result.note.clone()),
            ];
            if with_remarks {
                row.push(Cell::Text(result.remark.clone()));
            }
            table.push_row(row)?;
        }
        Ok(table)
    }
}

/// Characteristics of one criterion's reference dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceSummary {
    pub criterion: String,
    pub shape: Shape,
    /// Distinct reference values, for membership criteria.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// The persisted output of a grading run.
#[derive(Debug, Clone, Serialize)]
pub struct GradingReport {
    pub assignment: String,
    pub created_at: DateTime<Utc>,
    pub references: Vec<ReferenceSummary>,
    pub submissions: Vec<ResultsTable>,
}

impl GradingReport {
    pub fn new(assignment: impl Into<String>, references: Vec<ReferenceSummary>) -> Self {
        Self {
            assignment: assignment.into(),
            created_at: Utc::now(),
            references,
            submissions: Vec::new(),
        }
    }

    pub fn submission(&self, label: &str) -> Option<&ResultsTable> {
        self.submissions.iter().find(|s| s.submission == label)
    }

    pub fn to_json(&self) -> Result<String, MarkerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), MarkerError> {
        util::paths::ensure_parent_dir(path)?;
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Write one `<submission>.csv` per graded submission and one
    /// `<criterion> reference values.csv` per membership criterion into `dir`.
    /// Returns the files written.
    pub fn write_sheets(&self, dir: &Path) -> Result<Vec<PathBuf>, MarkerError> {
        ensure_dir(dir)?;
        let mut written = Vec::new();

        for table in self
            .submissions
            .iter()
            .filter(|t| t.status == SubmissionStatus::Graded)
        {
            let path = dir.join(format!("{}.csv", sanitize_file_stem(&table.submission)));
            write_csv(&path, &table.to_dataset()?)?;
            written.push(path);
        }

        for reference in self.references.iter().filter(|r| !r.values.is_empty()) {
            let mut values = Dataset::new(["value"]);
            for value in &reference.values {
                values.push_row(vec![Cell::Text(value.clone())])?;
            }
            let path = dir.join(format!(
                "{} reference values.csv",
                sanitize_file_stem(&reference.criterion)
            ));
            write_csv(&path, &values)?;
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::workbook_loader::read_csv;
    use serde_json::Value;

    fn comparison(verdict: Verdict) -> Comparison {
        let shape = Shape { rows: 2, columns: 3 };
        Comparison {
            verdict,
            reference_shape: shape,
            candidate_shape: shape,
            matched: 6,
            compared: 6,
            missing_values: vec![],
            unexpected_values: vec![],
        }
    }

    fn table() -> ResultsTable {
        let missing = MarkerError::SheetNotFound {
            workbook: "BMI_Solution_R".into(),
            sheet: "Criteria_2".into(),
        };
        ResultsTable::graded(
            "R Submission",
            Path::new("BMI_Solution_R"),
            vec![
                CriterionResult::graded("Criteria_1", Grade::correct(), comparison(Verdict::Correct)),
                CriterionResult::import_error("Criteria_2", "could not import", &missing),
            ],
        )
    }

    #[test]
    fn score_is_share_of_correct_criteria() {
        assert_eq!(table().score, 50);
    }

    #[test]
    fn import_error_keeps_typed_detail() {
        let t = table();
        let result = t.result("Criteria_2").unwrap();
        assert_eq!(result.verdict, Verdict::ImportError);
        assert_eq!(
            result.detail.as_deref(),
            Some("sheet `Criteria_2` not found in BMI_Solution_R")
        );
        assert!(result.comparison.is_none());
    }

    #[test]
    fn json_uses_snake_case_verdicts_and_skips_empty_fields() {
        let mut report = GradingReport::new("BMI Risk Factors", vec![]);
        report.submissions.push(table());
        let value: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        let first = &value["submissions"][0]["results"][0];
        assert_eq!(first["verdict"], "correct");
        assert_eq!(first["note"], "");
        assert!(first.get("detail").is_none());
        assert!(first.get("remark").is_none());
        assert_eq!(value["submissions"][0]["status"], "graded");
        assert_eq!(value["submissions"][0]["results"][1]["verdict"], "import_error");
    }

    #[test]
    fn dataset_adds_remark_column_only_when_needed() {
        assert_eq!(
            table().to_dataset().unwrap().columns(),
            ["criterion", "verdict", "note"]
        );

        let mut t = table();
        t.results[0] = t.results[0].clone().with_remark("index column removed");
        let ds = t.to_dataset().unwrap();
        assert_eq!(ds.columns(), ["criterion", "verdict", "note", "remark"]);
        assert_eq!(ds.cell(0, "verdict"), Some(&Cell::from("Correct")));
    }

    #[test]
    fn write_sheets_skips_skipped_submissions() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut report = GradingReport::new(
            "FAERS",
            vec![ReferenceSummary {
                criterion: "Medications".into(),
                shape: Shape { rows: 2, columns: 1 },
                values: vec!["ASPIRIN".into(), "PHENYTOIN".into()],
            }],
        );
        report.submissions.push(table());
        report
            .submissions
            .push(ResultsTable::skipped("Python Submission", Path::new("missing")));

        let written = report.write_sheets(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("R Submission.csv").is_file());
        assert!(!dir.path().join("Python Submission.csv").exists());

        let values = read_csv(&dir.path().join("Medications reference values.csv")).unwrap();
        assert_eq!(values.row_count(), 2);

        let sheet = read_csv(&dir.path().join("R Submission.csv")).unwrap();
        assert_eq!(sheet.cell(1, "verdict"), Some(&Cell::from("ImportError")));
    }

    #[test]
    fn write_json_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("results/run.json");
        GradingReport::new("x", vec![]).write_json(&path).unwrap();
        assert!(path.is_file());
    }
}
