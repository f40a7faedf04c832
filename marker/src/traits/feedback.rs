//!
//! # Feedback Trait
//!
//! This module defines the [`Feedback`] trait, which turns a verdict into the
//! diagnostic note shown to the student. Strategies can be template-based
//! ([`AutoFeedback`](crate::feedback::auto_feedback::AutoFeedback)) or
//! instructor-specified ([`ManualFeedback`](crate::feedback::manual_feedback::ManualFeedback)).
//!

use crate::types::Verdict;

/// What a feedback strategy knows about the criterion being graded.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackContext<'a> {
    pub criterion: &'a str,
    pub required_columns: &'a [String],
}

/// A trait for pluggable feedback strategies in the marker system.
///
/// Implementations must return an empty note for [`Verdict::Correct`].
pub trait Feedback {
    fn note(&self, context: &FeedbackContext<'_>, verdict: Verdict) -> String;
}
