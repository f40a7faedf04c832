//! Grading configuration file model.
//!
//! A grading run is described by one JSON file: where the answer key lives, which
//! criteria are checked (and how), which submission workbooks to look for, and any
//! instructor-written feedback overrides. Relative paths inside the file are resolved
//! against the directory that contains it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::paths::resolve_against;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read grading config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid grading config JSON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid grading config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GradingMethod {
    /// Row-by-row comparison aligned on a key column.
    Rows,
    /// Comparison of the set of distinct values in one column.
    Membership,
}

/// Where a criterion's reference dataset comes from.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceSource {
    /// Read directly from a sheet of the solution workbook. `None` reuses the
    /// criterion's submission sheet name.
    Sheet {
        #[serde(default)]
        sheet: Option<String>,
    },
    /// Derived from raw measurements: patients at or above the BMI (and optional
    /// age) threshold, joined with their contact details.
    BmiCohort {
        min_bmi: f64,
        #[serde(default)]
        min_age: Option<f64>,
    },
}

impl Default for ReferenceSource {
    fn default() -> Self {
        ReferenceSource::Sheet { sheet: None }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolutionOptions {
    /// Solution workbook: a directory of `<sheet>.csv` files or a single CSV file.
    pub path: PathBuf,

    #[serde(default = "default_measurements_sheet")]
    pub measurements_sheet: String,

    #[serde(default = "default_contacts_sheet")]
    pub contacts_sheet: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CriterionConfig {
    pub id: String,

    /// Submission sheet holding the answer. `None` means the workbook's only sheet.
    #[serde(default)]
    pub sheet: Option<String>,

    #[serde(default = "default_method")]
    pub method: GradingMethod,

    /// Alignment key for row grading; the compared value column for membership grading.
    #[serde(alias = "value_column")]
    pub key_column: String,

    #[serde(default)]
    pub compared_columns: Vec<String>,

    /// Drop exported dataframe index columns before grading. Defaults to `true`
    /// for membership criteria and `false` for row criteria.
    #[serde(default)]
    pub strip_index: Option<bool>,

    #[serde(default)]
    pub reference: ReferenceSource,

    /// Per-verdict note overrides for this criterion only.
    #[serde(default)]
    pub feedback: BTreeMap<String, String>,
}

impl CriterionConfig {
    pub fn strips_index(&self) -> bool {
        self.strip_index
            .unwrap_or(self.method == GradingMethod::Membership)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionConfig {
    pub label: String,
    pub path: PathBuf,

    /// Optional submissions that are absent on disk are skipped instead of graded
    /// as import errors.
    #[serde(default = "default_optional")]
    pub optional: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedbackOptions {
    /// Per-verdict note overrides applied to every criterion.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputOptions {
    #[serde(default)]
    pub results_dir: Option<PathBuf>,

    #[serde(default = "default_report_file")]
    pub report_file: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            results_dir: None,
            report_file: default_report_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GradingConfig {
    #[serde(default = "default_assignment")]
    pub assignment: String,

    pub solution: SolutionOptions,

    pub criteria: Vec<CriterionConfig>,

    #[serde(default)]
    pub submissions: Vec<SubmissionConfig>,

    #[serde(default)]
    pub feedback: FeedbackOptions,

    #[serde(default)]
    pub output: OutputOptions,
}

impl GradingConfig {
    /// Parse a grading config from a JSON string without touching the filesystem.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Read, parse, validate and path-resolve a grading config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        cfg.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        cfg.resolve_paths(base);
        Ok(cfg)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("failed to serialize config: {e}")))?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.criteria.is_empty() {
            return Err(ConfigError::Invalid("at least one criterion is required".into()));
        }

        let mut seen = HashSet::new();
        for criterion in &self.criteria {
            if criterion.id.trim().is_empty() {
                return Err(ConfigError::Invalid("criterion id must not be empty".into()));
            }
            if !seen.insert(criterion.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate criterion id `{}`",
                    criterion.id
                )));
            }
            if criterion.key_column.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "criterion `{}` has no key column",
                    criterion.id
                )));
            }
            if let ReferenceSource::BmiCohort { min_bmi, .. } = criterion.reference {
                if !min_bmi.is_finite() {
                    return Err(ConfigError::Invalid(format!(
                        "criterion `{}` has a non-finite BMI threshold",
                        criterion.id
                    )));
                }
            }
        }

        let mut labels = HashSet::new();
        for submission in &self.submissions {
            if !labels.insert(submission.label.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate submission label `{}`",
                    submission.label
                )));
            }
        }

        Ok(())
    }

    /// Rewrite every relative path in the config so it is relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        self.solution.path = resolve_against(base, &self.solution.path);
        for submission in &mut self.submissions {
            submission.path = resolve_against(base, &submission.path);
        }
        if let Some(dir) = self.output.results_dir.take() {
            self.output.results_dir = Some(resolve_against(base, &dir));
        }
    }
}

//Default Functions

fn default_assignment() -> String {
    "Assignment".to_string()
}

fn default_measurements_sheet() -> String {
    "HeightWeight".to_string()
}

fn default_contacts_sheet() -> String {
    "Contact Info".to_string()
}

fn default_method() -> GradingMethod {
    GradingMethod::Rows
}

fn default_optional() -> bool {
    true
}

fn default_report_file() -> String {
    "results.json".to_string()
}
