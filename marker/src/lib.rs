//! # Marker Library
//!
//! This crate provides the core logic for grading spreadsheet submissions against an
//! instructor-maintained answer key. It loads workbooks, builds the reference dataset for
//! each criterion, compares datasets using pluggable strategies and produces a results
//! table with one verdict and diagnostic note per criterion.
//!
//! ## Key Concepts
//! - **GradingJob**: A configured grading run over any number of submission workbooks.
//! - **Comparators**: Row-set comparison aligned on a key column, or set membership of one column.
//! - **Feedback**: Notes per verdict, automatic or instructor-specified.
//! - **Reports**: Results tables per submission, and a JSON report of the run.

pub mod answer_key;
pub mod comparators;
pub mod error;
pub mod feedback;
pub mod report;
pub mod scorer;
pub mod traits;
pub mod types;
pub mod utilities;

use crate::answer_key::AnswerKey;
use crate::comparators::membership_comparator::MembershipGrader;
use crate::comparators::row_set_comparator::RowSetGrader;
use crate::error::MarkerError;
use crate::feedback::auto_feedback::{AutoFeedback, INDEX_NOTE};
use crate::feedback::manual_feedback::ManualFeedback;
use crate::report::{CriterionResult, GradingReport, ReferenceSummary, ResultsTable};
use crate::traits::comparator::Comparator;
use crate::traits::feedback::{Feedback, FeedbackContext};
use crate::types::{Dataset, Grade, Verdict};
use crate::utilities::workbook_loader::Workbook;

use std::path::Path;
use tracing::{error, info, warn};
use util::grading_config::{CriterionConfig, GradingConfig, GradingMethod};

/// Grade one candidate dataset against its reference with a [`RowSetGrader`] and the
/// automatic notes.
///
/// A candidate too malformed to compare (e.g. lacking the key column) grades as
/// `ImportError`. A reference lacking the key or a compared column is a
/// configuration error.
pub fn grade(
    reference: &Dataset,
    candidate: &Dataset,
    key_column: &str,
    compared_columns: &[&str],
) -> Result<Grade, MarkerError> {
    let grader = RowSetGrader::new(key_column, compared_columns.iter().copied());
    let context = FeedbackContext {
        criterion: "",
        required_columns: grader.required_columns(),
    };
    let verdict = match grader.compare(reference, candidate) {
        Ok(comparison) => comparison.verdict,
        Err(e) if e.is_load_failure() => {
            warn!(error = %e, "candidate could not be compared");
            Verdict::ImportError
        }
        Err(e) => return Err(e),
    };
    Ok(Grade {
        verdict,
        note: AutoFeedback.note(&context, verdict),
    })
}

/// A configured grading run.
///
/// Holds the grading configuration, the reference dataset of every criterion and the
/// feedback strategy. Grading never mutates the job, so one job grades any number of
/// submissions.
pub struct GradingJob<'a> {
    config: GradingConfig,
    answer_key: AnswerKey,
    feedback: Box<dyn Feedback + 'a>,
}

impl<'a> GradingJob<'a> {
    /// Create a job from a configuration and an already built answer key.
    ///
    /// Fails with [`MarkerError::InvalidConfig`] when the configuration is invalid,
    /// a criterion has no reference dataset, or a feedback override names an
    /// unknown verdict.
    pub fn new(config: GradingConfig, answer_key: AnswerKey) -> Result<Self, MarkerError> {
        config
            .validate()
            .map_err(|e| MarkerError::InvalidConfig(e.to_string()))?;
        if let Some(missing) = config
            .criteria
            .iter()
            .find(|c| answer_key.get(&c.id).is_none())
        {
            return Err(MarkerError::InvalidConfig(format!(
                "no reference dataset for criterion `{}`",
                missing.id
            )));
        }

        let mut feedback = ManualFeedback::new(&config.feedback.overrides)?;
        for criterion in &config.criteria {
            feedback = feedback.with_criterion(&criterion.id, &criterion.feedback)?;
        }

        Ok(Self {
            config,
            answer_key,
            feedback: Box::new(feedback),
        })
    }

    /// Build the answer key described by `config`, then create the job.
    pub fn from_config(config: GradingConfig) -> Result<Self, MarkerError> {
        let answer_key = AnswerKey::build(&config)?;
        Self::new(config, answer_key)
    }

    /// Set a custom feedback strategy for this grading job.
    pub fn with_feedback<F: Feedback + 'a>(mut self, feedback: F) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    pub fn answer_key(&self) -> &AnswerKey {
        &self.answer_key
    }

    /// Shape (and, for membership criteria, distinct values) of every reference dataset.
    pub fn references(&self) -> Vec<ReferenceSummary> {
        self.config
            .criteria
            .iter()
            .filter_map(|criterion| {
                let reference = self.answer_key.get(&criterion.id)?;
                let values = match criterion.method {
                    GradingMethod::Membership => MembershipGrader::new(&criterion.key_column)
                        .distinct_values(reference)
                        .map(|set| set.into_iter().collect())
                        .unwrap_or_default(),
                    GradingMethod::Rows => Vec::new(),
                };
                Some(ReferenceSummary {
                    criterion: criterion.id.clone(),
                    shape: reference.shape(),
                    values,
                })
            })
            .collect()
    }

    /// Grade every criterion against one opened workbook.
    ///
    /// Load failures are isolated per criterion: a missing sheet or malformed data
    /// becomes an `ImportError` result and the remaining criteria are still graded.
    pub fn grade_workbook(&self, workbook: &Workbook) -> Result<Vec<CriterionResult>, MarkerError> {
        self.config
            .criteria
            .iter()
            .map(|criterion| {
                let comparator = comparator_for(criterion);
                match self.grade_criterion(criterion, comparator.as_ref(), workbook) {
                    Err(e) if e.is_load_failure() => {
                        error!(
                            criterion = %criterion.id,
                            workbook = %workbook.path().display(),
                            "{e}"
                        );
                        Ok(self.import_error(criterion, comparator.as_ref(), &e))
                    }
                    other => other,
                }
            })
            .collect()
    }

    /// Open and grade one submission. A workbook that cannot be opened grades every
    /// criterion as `ImportError`.
    pub fn grade_path(&self, label: &str, path: &Path) -> Result<ResultsTable, MarkerError> {
        let results = match Workbook::open(path) {
            Ok(workbook) => self.grade_workbook(&workbook)?,
            Err(e) => {
                error!(submission = %label, path = %path.display(), "{e}");
                self.config
                    .criteria
                    .iter()
                    .map(|criterion| {
                        self.import_error(criterion, comparator_for(criterion).as_ref(), &e)
                    })
                    .collect()
            }
        };

        let table = ResultsTable::graded(label, path, results);
        info!(
            submission = %label,
            score = table.score,
            "graded {} criteria",
            table.results.len()
        );
        Ok(table)
    }

    /// Grade every configured submission. Optional submissions that are absent on
    /// disk are reported as skipped.
    pub fn grade_submissions(&self) -> Result<GradingReport, MarkerError> {
        let mut report = GradingReport::new(&self.config.assignment, self.references());
        for submission in &self.config.submissions {
            if submission.optional && !submission.path.exists() {
                info!(
                    submission = %submission.label,
                    path = %submission.path.display(),
                    "no submission file found, skipping"
                );
                report
                    .submissions
                    .push(ResultsTable::skipped(&submission.label, &submission.path));
                continue;
            }
            report
                .submissions
                .push(self.grade_path(&submission.label, &submission.path)?);
        }
        Ok(report)
    }

    fn grade_criterion(
        &self,
        criterion: &CriterionConfig,
        comparator: &dyn Comparator,
        workbook: &Workbook,
    ) -> Result<CriterionResult, MarkerError> {
        let reference = self.answer_key.get(&criterion.id).ok_or_else(|| {
            MarkerError::InvalidConfig(format!(
                "no reference dataset for criterion `{}`",
                criterion.id
            ))
        })?;

        let mut candidate = workbook.sheet(criterion.sheet.as_deref())?;
        let stripped = if criterion.strips_index() {
            candidate.strip_index_columns()
        } else {
            Vec::new()
        };

        let comparison = comparator.compare(reference, &candidate)?;
        let context = FeedbackContext {
            criterion: &criterion.id,
            required_columns: comparator.required_columns(),
        };
        let grade = Grade {
            verdict: comparison.verdict,
            note: self.feedback.note(&context, comparison.verdict),
        };

        let result = CriterionResult::graded(&criterion.id, grade, comparison);
        if stripped.is_empty() {
            Ok(result)
        } else {
            info!(criterion = %criterion.id, columns = ?stripped, "removed exported index columns");
            Ok(result.with_remark(INDEX_NOTE))
        }
    }

    fn import_error(
        &self,
        criterion: &CriterionConfig,
        comparator: &dyn Comparator,
        err: &MarkerError,
    ) -> CriterionResult {
        let context = FeedbackContext {
            criterion: &criterion.id,
            required_columns: comparator.required_columns(),
        };
        let note = self.feedback.note(&context, Verdict::ImportError);
        CriterionResult::import_error(&criterion.id, note, err)
    }
}

fn comparator_for(criterion: &CriterionConfig) -> Box<dyn Comparator> {
    match criterion.method {
        GradingMethod::Rows => Box::new(RowSetGrader::new(
            criterion.key_column.as_str(),
            criterion.compared_columns.iter().map(String::as_str),
        )),
        GradingMethod::Membership => Box::new(MembershipGrader::new(criterion.key_column.as_str())),
    }
}
