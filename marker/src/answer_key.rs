//! # Answer Key
//!
//! Builds one reference dataset per criterion from the solution workbook, either by
//! reading a sheet directly or by deriving it from raw measurements (BMI cohort).
//!
//! Every problem here is on the instructor side, so load failures are reported as
//! [`MarkerError::InvalidConfig`] and stop the run before any submission is graded.

use crate::error::MarkerError;
use crate::types::{Cell, Dataset};
use crate::utilities::workbook_loader::Workbook;
use std::collections::BTreeMap;
use tracing::{info, warn};
use util::grading_config::{CriterionConfig, GradingConfig, GradingMethod, ReferenceSource};

pub const ID_COLUMN: &str = "ID";
pub const AGE_COLUMN: &str = "Age";
pub const HEIGHT_COLUMN: &str = "Height (cm)";
pub const WEIGHT_COLUMN: &str = "Weight (kg)";
pub const BMI_COLUMN: &str = "BMI";

/// Reference datasets keyed by criterion id.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    references: BTreeMap<String, Dataset>,
}

impl AnswerKey {
    pub fn build(config: &GradingConfig) -> Result<Self, MarkerError> {
        let workbook = Workbook::open(&config.solution.path).map_err(instructor_side)?;
        let needs_measurements = config
            .criteria
            .iter()
            .any(|c| matches!(c.reference, ReferenceSource::BmiCohort { .. }));
        let measurements = if needs_measurements {
            let raw = workbook
                .sheet(Some(&config.solution.measurements_sheet))
                .map_err(instructor_side)?;
            let contacts = workbook
                .sheet(Some(&config.solution.contacts_sheet))
                .map_err(instructor_side)?;
            Some((with_bmi(&raw)?, contacts))
        } else {
            None
        };

        let mut references = BTreeMap::new();
        for criterion in &config.criteria {
            let reference = match &criterion.reference {
                ReferenceSource::Sheet { sheet } => {
                    let name = sheet.as_deref().or(criterion.sheet.as_deref());
                    let mut dataset = workbook.sheet(name).map_err(instructor_side)?;
                    if criterion.strips_index() {
                        dataset.strip_index_columns();
                    }
                    dataset
                }
                ReferenceSource::BmiCohort { min_bmi, min_age } => {
                    let Some((measured, contacts)) = &measurements else {
                        return Err(MarkerError::InvalidConfig(
                            "measurement sheets were not loaded".to_string(),
                        ));
                    };
                    cohort_from_bmi(measured, contacts, *min_bmi, *min_age)?
                }
            };

            check_reference(criterion, &reference)?;
            info!(
                criterion = %criterion.id,
                rows = reference.row_count(),
                columns = reference.column_count(),
                "reference dataset ready"
            );
            references.insert(criterion.id.clone(), reference);
        }

        Ok(Self { references })
    }

    pub fn get(&self, criterion: &str) -> Option<&Dataset> {
        self.references.get(criterion)
    }

    pub fn insert(&mut self, criterion: impl Into<String>, reference: Dataset) {
        self.references.insert(criterion.into(), reference);
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

fn instructor_side(err: MarkerError) -> MarkerError {
    match err {
        MarkerError::InvalidConfig(_) => err,
        other => MarkerError::InvalidConfig(format!("answer key: {other}")),
    }
}

fn check_reference(criterion: &CriterionConfig, reference: &Dataset) -> Result<(), MarkerError> {
    let required: Vec<&str> = match criterion.method {
        GradingMethod::Rows => std::iter::once(criterion.key_column.as_str())
            .chain(criterion.compared_columns.iter().map(String::as_str))
            .collect(),
        GradingMethod::Membership => vec![criterion.key_column.as_str()],
    };
    for column in required {
        if !reference.has_column(column) {
            return Err(MarkerError::InvalidConfig(format!(
                "reference for criterion `{}` has no column `{column}`",
                criterion.id
            )));
        }
    }
    if reference.is_empty() {
        warn!(criterion = %criterion.id, "reference dataset is empty");
    }
    Ok(())
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Append a `BMI` column: `weight / (height / 100)^2`, rounded to two decimals.
/// Missing or non-positive measurements give a null BMI.
pub fn with_bmi(measurements: &Dataset) -> Result<Dataset, MarkerError> {
    for column in [ID_COLUMN, HEIGHT_COLUMN, WEIGHT_COLUMN] {
        if !measurements.has_column(column) {
            return Err(MarkerError::InvalidConfig(format!(
                "measurements sheet has no column `{column}`"
            )));
        }
    }
    Ok(measurements.with_computed_column(BMI_COLUMN, |row| {
        let height = row.get(HEIGHT_COLUMN).and_then(Cell::as_number);
        let weight = row.get(WEIGHT_COLUMN).and_then(Cell::as_number);
        match (height, weight) {
            (Some(h), Some(w)) if h > 0.0 => Cell::from(round2(w / (h / 100.0).powi(2))),
            _ => Cell::Null,
        }
    }))
}

/// Patients with `BMI >= min_bmi` (and `Age >= min_age` when given), joined with
/// their contact details and sorted by `ID`.
pub fn bmi_cohort(
    measurements: &Dataset,
    contacts: &Dataset,
    min_bmi: f64,
    min_age: Option<f64>,
) -> Result<Dataset, MarkerError> {
    cohort_from_bmi(&with_bmi(measurements)?, contacts, min_bmi, min_age)
}

fn cohort_from_bmi(
    measured: &Dataset,
    contacts: &Dataset,
    min_bmi: f64,
    min_age: Option<f64>,
) -> Result<Dataset, MarkerError> {
    if min_age.is_some() && !measured.has_column(AGE_COLUMN) {
        return Err(MarkerError::InvalidConfig(format!(
            "measurements sheet has no column `{AGE_COLUMN}`"
        )));
    }
    if !contacts.has_column(ID_COLUMN) {
        return Err(MarkerError::InvalidConfig(format!(
            "contacts sheet has no column `{ID_COLUMN}`"
        )));
    }

    let at_least = |cell: Option<&Cell>, min: f64| {
        cell.and_then(Cell::as_number).is_some_and(|v| v >= min)
    };
    let selected = measured
        .filter_rows(|row| {
            at_least(row.get(BMI_COLUMN), min_bmi)
                && min_age.is_none_or(|age| at_least(row.get(AGE_COLUMN), age))
        })
        .select(&[ID_COLUMN])?;

    selected.inner_join(contacts, ID_COLUMN)?.aligned_by(ID_COLUMN)
}
