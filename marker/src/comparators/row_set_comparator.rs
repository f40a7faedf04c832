//! A comparator that aligns two datasets on a key column and checks that the
//! candidate reproduces the reference row set, **cell by cell, in key order**.
//!
//! Both sides drop null-key rows and are sorted by key first. The comparison grid
//! then takes the *larger* side's shape, so a short submission is checked over
//! the full reference length instead of only its own: cells past the end of the
//! shorter dataset, or in a column one side lacks, count as failed comparisons.

use crate::error::MarkerError;
use crate::traits::comparator::{Comparator, Comparison};
use crate::types::{Cell, Dataset, Verdict};
use tracing::{debug, warn};

/// Row-set grader parameterized by key column and compared columns.
///
/// The key column is always part of the compared columns; it is prepended when
/// the caller does not list it.
#[derive(Debug, Clone)]
pub struct RowSetGrader {
    key_column: String,
    compared_columns: Vec<String>,
}

impl RowSetGrader {
    pub fn new<I, S>(key_column: impl Into<String>, compared_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key_column = key_column.into();
        let mut columns = vec![key_column.clone()];
        for column in compared_columns.into_iter().map(Into::into) {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        Self {
            key_column,
            compared_columns: columns,
        }
    }

    pub fn compared_columns(&self) -> &[String] {
        &self.compared_columns
    }

    fn check_reference(&self, reference: &Dataset) -> Result<(), MarkerError> {
        for column in &self.compared_columns {
            if !reference.has_column(column) {
                return Err(MarkerError::InvalidConfig(format!(
                    "reference dataset has no column `{column}`"
                )));
            }
        }
        Ok(())
    }
}

impl Comparator for RowSetGrader {
    fn compare(
        &self,
        reference: &Dataset,
        candidate: &Dataset,
    ) -> Result<Comparison, MarkerError> {
        self.check_reference(reference)?;
        if !candidate.has_column(&self.key_column) {
            return Err(MarkerError::MissingColumn {
                dataset: "submission".to_string(),
                column: self.key_column.clone(),
            });
        }

        let reference = reference.aligned_by(&self.key_column)?;
        let candidate = candidate.aligned_by(&self.key_column)?;
        warn_on_duplicate_keys(&reference, &self.key_column);

        let reference_shape = reference.shape();
        let candidate_shape = candidate.shape();

        let n = reference_shape.rows.max(candidate_shape.rows);
        let m = reference_shape.columns.max(candidate_shape.columns);

        let mut matched = 0;
        for column in &self.compared_columns {
            for index in 0..n {
                if let (Some(expected), Some(actual)) =
                    (reference.cell(index, column), candidate.cell(index, column))
                {
                    if expected == actual {
                        matched += 1;
                    }
                }
            }
        }
        let compared = n * self.compared_columns.len();

        let verdict = if matched == compared
            && m == reference_shape.columns
            && m == candidate_shape.columns
        {
            Verdict::Correct
        } else if reference_shape.rows != candidate_shape.rows {
            Verdict::RowCountMismatch
        } else if reference_shape.columns != candidate_shape.columns {
            Verdict::ColumnCountMismatch
        } else {
            Verdict::ContentMismatch
        };

        debug!(
            key = %self.key_column,
            matched,
            compared,
            ?verdict,
            "row-set comparison finished"
        );

        Ok(Comparison {
            verdict,
            reference_shape,
            candidate_shape,
            matched,
            compared,
            missing_values: Vec::new(),
            unexpected_values: Vec::new(),
        })
    }

    fn required_columns(&self) -> &[String] {
        &self.compared_columns
    }
}

fn warn_on_duplicate_keys(aligned: &Dataset, key: &str) {
    let Some(values) = aligned.column_values(key) else {
        return;
    };
    let mut previous: Option<&Cell> = None;
    for value in values {
        if previous == Some(value) {
            warn!(key, value = %value, "reference dataset has a duplicate key");
        }
        previous = Some(value);
    }
}
