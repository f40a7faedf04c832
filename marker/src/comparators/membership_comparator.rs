//! A comparator that checks whether the candidate identified the same **set of
//! distinct values** in one column as the reference (e.g. the medications present
//! in a filtered adverse-event extract). Row order, duplicates and other columns
//! are irrelevant.
//!
//! Superset and subset are evaluated as independent membership predicates, so a
//! candidate that is larger *and* missing reference values is a
//! [`Verdict::SetMismatch`], not [`Verdict::TooMany`].

use crate::error::MarkerError;
use crate::traits::comparator::{Comparator, Comparison};
use crate::types::{Dataset, Verdict};
use std::collections::BTreeSet;

pub struct MembershipGrader {
    column: Vec<String>,
}

impl MembershipGrader {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: vec![column.into()],
        }
    }

    pub fn column(&self) -> &str {
        &self.column[0]
    }

    /// Distinct non-null values of the graded column, in sorted order.
    pub fn distinct_values(&self, dataset: &Dataset) -> Option<BTreeSet<String>> {
        Some(
            dataset
                .column_values(self.column())?
                .filter(|c| !c.is_null())
                .map(|c| c.to_string())
                .collect(),
        )
    }
}

impl Comparator for MembershipGrader {
    fn compare(
        &self,
        reference: &Dataset,
        candidate: &Dataset,
    ) -> Result<Comparison, MarkerError> {
        let expected = self.distinct_values(reference).ok_or_else(|| {
            MarkerError::InvalidConfig(format!(
                "reference dataset has no column `{}`",
                self.column()
            ))
        })?;
        let actual =
            self.distinct_values(candidate)
                .ok_or_else(|| MarkerError::MissingColumn {
                    dataset: "submission".to_string(),
                    column: self.column().to_string(),
                })?;

        let verdict = if actual == expected {
            Verdict::Correct
        } else if actual.is_superset(&expected) {
            Verdict::TooMany
        } else if actual.is_subset(&expected) {
            Verdict::TooFew
        } else {
            Verdict::SetMismatch
        };

        Ok(Comparison {
            verdict,
            reference_shape: reference.shape(),
            candidate_shape: candidate.shape(),
            matched: expected.intersection(&actual).count(),
            compared: expected.union(&actual).count(),
            missing_values: expected.difference(&actual).cloned().collect(),
            unexpected_values: actual.difference(&expected).cloned().collect(),
        })
    }

    fn required_columns(&self) -> &[String] {
        &self.column
    }
}
