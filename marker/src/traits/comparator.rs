use crate::error::MarkerError;
use crate::types::{Dataset, Shape, Verdict};
use serde::Serialize;

/// The outcome of one comparison, with enough detail for the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub verdict: Verdict,
    pub reference_shape: Shape,
    pub candidate_shape: Shape,
    /// Cells (row grading) or distinct values (membership grading) that matched.
    pub matched: usize,
    /// Size of the comparison grid the matches are counted against.
    pub compared: usize,
    /// Reference values the candidate lacks (membership grading only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_values: Vec<String>,
    /// Candidate values the reference lacks (membership grading only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unexpected_values: Vec<String>,
}

/// Comparator is a strategy trait for comparing a candidate dataset against a
/// reference dataset. Each implementation classifies the discrepancy into a
/// [`Verdict`].
///
/// Implementations must be pure: the same inputs always produce the same
/// [`Comparison`].
pub trait Comparator {
    /// Compare `candidate` against `reference`.
    ///
    /// - Returns [`MarkerError::InvalidConfig`] when the reference itself cannot
    ///   support the comparison (e.g. it lacks the key column).
    /// - Returns a load failure (e.g. [`MarkerError::MissingColumn`]) when the
    ///   candidate is too malformed to compare.
    fn compare(&self, reference: &Dataset, candidate: &Dataset)
    -> Result<Comparison, MarkerError>;

    /// Columns the student's answer is expected to contain, used in notes.
    fn required_columns(&self) -> &[String];
}
