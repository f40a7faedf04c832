//! Manual feedback strategy: allows instructors to specify custom notes per verdict.
//!
//! Overrides come from the grading configuration, either for every criterion or for
//! one criterion by id. A verdict without an override falls back to
//! [`AutoFeedback`]. `Correct` is never overridden.

use crate::error::MarkerError;
use crate::feedback::auto_feedback::AutoFeedback;
use crate::traits::feedback::{Feedback, FeedbackContext};
use crate::types::Verdict;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Clone)]
pub struct ManualFeedback {
    global: HashMap<Verdict, String>,
    per_criterion: HashMap<String, HashMap<Verdict, String>>,
}

impl ManualFeedback {
    /// Build from a map of verdict key (`"content_mismatch"`, ...) to note.
    pub fn new(overrides: &BTreeMap<String, String>) -> Result<Self, MarkerError> {
        Ok(Self {
            global: parse_overrides(overrides)?,
            per_criterion: HashMap::new(),
        })
    }

    pub fn with_criterion(
        mut self,
        criterion: impl Into<String>,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Self, MarkerError> {
        let parsed = parse_overrides(overrides)?;
        if !parsed.is_empty() {
            self.per_criterion.insert(criterion.into(), parsed);
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.per_criterion.is_empty()
    }
}

fn parse_overrides(
    overrides: &BTreeMap<String, String>,
) -> Result<HashMap<Verdict, String>, MarkerError> {
    overrides
        .iter()
        .map(|(key, note)| {
            let verdict = Verdict::from_key(key).ok_or_else(|| {
                MarkerError::InvalidConfig(format!("unknown verdict `{key}` in feedback overrides"))
            })?;
            if verdict.is_correct() {
                return Err(MarkerError::InvalidConfig(
                    "the `correct` verdict cannot carry a note".to_string(),
                ));
            }
            Ok((verdict, note.clone()))
        })
        .collect()
}

impl Feedback for ManualFeedback {
    fn note(&self, context: &FeedbackContext<'_>, verdict: Verdict) -> String {
        if verdict.is_correct() {
            return String::new();
        }
        self.per_criterion
            .get(context.criterion)
            .and_then(|m| m.get(&verdict))
            .or_else(|| self.global.get(&verdict))
            .cloned()
            .unwrap_or_else(|| AutoFeedback.note(context, verdict))
    }
}
