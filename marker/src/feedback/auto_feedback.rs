//! # AutoFeedback Strategy
//!
//! This module provides the `AutoFeedback` strategy for the marker system.
//! It implements the [`Feedback`] trait with fixed, template-based notes: one per
//! verdict, worded so a student can tell which category of mistake they made
//! without being shown the answer key.
//!
//! ## Overview
//!
//! - `Correct` always produces an empty note.
//! - `ColumnCountMismatch` names the columns the answer is expected to contain.
//! - `ImportError` points the student at the manual submission key.

use crate::traits::feedback::{Feedback, FeedbackContext};
use crate::types::Verdict;

/// Note attached to every criterion whose submission could not be loaded.
pub const IMPORT_ERROR_NOTE: &str = "Error importing file, please check your submission. \
If you feel this is an error, please contact the instructors and consult the manual \
submission key for feedback in the interim";

/// Informational remark for submissions exported together with their dataframe index.
pub const INDEX_NOTE: &str = "When exporting your data, you specified the option \
(index=True) or otherwise did not change the default behavior of the export function. \
This is okay! But you should be aware of the option and the difference between data \
imported with and without the retained index";

const ROW_COUNT_NOTE: &str = "Unequal number of rows (i.e. observations). Some records \
incorrectly included and/or some incorrectly excluded";

const CONTENT_NOTE: &str = "Correct dimensions supplied (i.e. correct number of rows and \
columns), but some correct observations erroneously excluded as well as incorrect \
records included";

const TOO_MANY_NOTE: &str = "You've identified more values than the list in the solution. \
Compare those in your final data set to the reference list";

const TOO_FEW_NOTE: &str = "You've identified fewer values than the list in the solution. \
Compare those in your final data set to the reference list";

const SET_MISMATCH_NOTE: &str = "You've identified some values incorrectly and/or omitted \
some in comparison to the solution list. Compare those in your final data set to the \
reference list";

/// Automatic feedback strategy: one fixed note per verdict.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoFeedback;

impl Feedback for AutoFeedback {
    fn note(&self, context: &FeedbackContext<'_>, verdict: Verdict) -> String {
        match verdict {
            Verdict::Correct => String::new(),
            Verdict::RowCountMismatch => ROW_COUNT_NOTE.to_string(),
            Verdict::ColumnCountMismatch => format!(
                "Unequal number of columns. Ensure your answer contains only {}",
                human_list(context.required_columns)
            ),
            Verdict::ContentMismatch => CONTENT_NOTE.to_string(),
            Verdict::TooMany => TOO_MANY_NOTE.to_string(),
            Verdict::TooFew => TOO_FEW_NOTE.to_string(),
            Verdict::SetMismatch => SET_MISMATCH_NOTE.to_string(),
            Verdict::ImportError => IMPORT_ERROR_NOTE.to_string(),
        }
    }
}

/// `a`, `a and b`, `a, b, and c`.
fn human_list(items: &[String]) -> String {
    match items {
        [] => "the requested columns".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(columns: &[String]) -> FeedbackContext<'_> {
        FeedbackContext {
            criterion: "Criteria_1",
            required_columns: columns,
        }
    }

    fn bmi_columns() -> Vec<String> {
        vec!["ID".into(), "PhoneNo".into(), "Address".into()]
    }

    #[test]
    fn correct_has_empty_note() {
        let columns = bmi_columns();
        assert_eq!(AutoFeedback.note(&context(&columns), Verdict::Correct), "");
    }

    #[test]
    fn every_failure_has_a_note() {
        let columns = bmi_columns();
        for verdict in Verdict::ALL.into_iter().filter(|v| !v.is_correct()) {
            assert!(!AutoFeedback.note(&context(&columns), verdict).is_empty());
        }
    }

    #[test]
    fn column_note_names_required_columns() {
        let columns = bmi_columns();
        let note = AutoFeedback.note(&context(&columns), Verdict::ColumnCountMismatch);
        assert_eq!(
            note,
            "Unequal number of columns. Ensure your answer contains only ID, PhoneNo, and Address"
        );
    }

    #[test]
    fn human_list_handles_short_lists() {
        assert_eq!(human_list(&["prod_ai".to_string()]), "prod_ai");
        assert_eq!(
            human_list(&["ID".to_string(), "PhoneNo".to_string()]),
            "ID and PhoneNo"
        );
    }

    #[test]
    fn import_error_uses_fixed_note() {
        let columns = bmi_columns();
        assert_eq!(
            AutoFeedback.note(&context(&columns), Verdict::ImportError),
            IMPORT_ERROR_NOTE
        );
    }
}
