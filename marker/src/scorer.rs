//! # Scorer Module
//!
//! Aggregates per-criterion verdicts into a single score for a submission.

use crate::report::CriterionResult;

/// Computes the overall score as the percentage of criteria graded `Correct`,
/// rounded to the nearest integer.
///
/// An empty slice scores 0.
///
/// # Example
///
/// ```
/// use marker::report::CriterionResult;
/// use marker::scorer::compute_overall_score;
/// use marker::error::MarkerError;
///
/// let missing = MarkerError::FileNotFound("BMI_Solution_Python".into());
/// let results = vec![
///     CriterionResult::import_error("Criteria_1", "could not import", &missing),
/// ];
/// assert_eq!(compute_overall_score(&results), 0);
/// assert_eq!(compute_overall_score(&[]), 0);
/// ```
pub fn compute_overall_score(results: &[CriterionResult]) -> u32 {
    if results.is_empty() {
        return 0;
    }

    let correct = results.iter().filter(|r| r.verdict.is_correct()).count();
    let share = correct as f64 / results.len() as f64;

    (share * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::comparator::Comparison;
    use crate::types::{Grade, Shape, Verdict};

    fn result(verdict: Verdict) -> CriterionResult {
        let shape = Shape { rows: 1, columns: 1 };
        CriterionResult::graded(
            "c",
            Grade {
                verdict,
                note: String::new(),
            },
            Comparison {
                verdict,
                reference_shape: shape,
                candidate_shape: shape,
                matched: 0,
                compared: 0,
                missing_values: vec![],
                unexpected_values: vec![],
            },
        )
    }

    #[test]
    fn test_compute_overall_score_basic() {
        let results = vec![
            result(Verdict::Correct),
            result(Verdict::Correct),
            result(Verdict::ContentMismatch),
            result(Verdict::RowCountMismatch),
        ];
        assert_eq!(compute_overall_score(&results), 50);
    }

    #[test]
    fn test_compute_overall_score_rounds() {
        let results = vec![
            result(Verdict::Correct),
            result(Verdict::Correct),
            result(Verdict::TooFew),
        ];
        assert_eq!(compute_overall_score(&results), 67);
    }

    #[test]
    fn test_compute_overall_score_all_correct() {
        let results = vec![result(Verdict::Correct); 4];
        assert_eq!(compute_overall_score(&results), 100);
    }
}
