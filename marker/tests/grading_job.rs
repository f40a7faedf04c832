use marker::GradingJob;
use marker::error::MarkerError;
use marker::feedback::auto_feedback::{IMPORT_ERROR_NOTE, INDEX_NOTE};
use marker::report::SubmissionStatus;
use marker::traits::feedback::{Feedback, FeedbackContext};
use marker::types::Verdict;
use std::fs;
use std::path::Path;
use util::grading_config::GradingConfig;
use util::test_helpers::{setup_test_dir, write_csv_file, write_sheet};

const CONTACTS: &str = "id,phone,addr\n1,555-0100,1 Main St\n2,555-0200,2 Oak St\n";

fn contacts_config(dir: &Path, submissions: &str) -> GradingConfig {
    let raw = format!(
        r#"{{
            "assignment": "Contacts",
            "solution": {{ "path": "answer_key" }},
            "criteria": [
                {{ "id": "Criteria_1", "sheet": "Criteria_1", "key_column": "id",
                   "compared_columns": ["phone", "addr"] }},
                {{ "id": "Criteria_2", "sheet": "Criteria_2", "key_column": "id",
                   "compared_columns": ["phone", "addr"] }}
            ],
            "submissions": [{submissions}]
        }}"#
    );
    let path = dir.join("grading.json");
    fs::write(&path, raw).unwrap();
    GradingConfig::load(&path).unwrap()
}

fn answer_key(dir: &Path) {
    write_sheet(dir, "answer_key", "Criteria_1", CONTACTS);
    write_sheet(dir, "answer_key", "Criteria_2", CONTACTS);
}

#[test]
fn contact_scenario_verdicts() {
    let dir = setup_test_dir();
    answer_key(dir.path());

    write_sheet(dir.path(), "identical", "Criteria_1", CONTACTS);
    write_sheet(dir.path(), "identical", "Criteria_2", CONTACTS);

    write_sheet(dir.path(), "short", "Criteria_1", "id,phone,addr\n1,555-0100,1 Main St\n");
    write_sheet(
        dir.path(),
        "short",
        "Criteria_2",
        "id,phone,addr\n1,555-0100,1 Main St\n2,555-9999,2 Oak St\n",
    );

    write_sheet(
        dir.path(),
        "wide",
        "Criteria_1",
        "id,phone,addr,notes\n1,555-0100,1 Main St,\n2,555-0200,2 Oak St,\n",
    );
    write_sheet(dir.path(), "wide", "Criteria_2", CONTACTS);

    let config = contacts_config(
        dir.path(),
        r#"{ "label": "Identical", "path": "identical" },
           { "label": "Short", "path": "short" },
           { "label": "Wide", "path": "wide" },
           { "label": "Missing", "path": "missing", "optional": false }"#,
    );
    let job = GradingJob::from_config(config).unwrap();
    let report = job.grade_submissions().unwrap();

    let identical = report.submission("Identical").unwrap();
    assert_eq!(identical.score, 100);
    for result in &identical.results {
        assert_eq!(result.verdict, Verdict::Correct);
        assert_eq!(result.note, "");
    }

    let short = report.submission("Short").unwrap();
    assert_eq!(
        short.result("Criteria_1").unwrap().verdict,
        Verdict::RowCountMismatch
    );
    assert_eq!(
        short.result("Criteria_2").unwrap().verdict,
        Verdict::ContentMismatch
    );

    let wide = report.submission("Wide").unwrap();
    assert_eq!(
        wide.result("Criteria_1").unwrap().verdict,
        Verdict::ColumnCountMismatch
    );
    assert_eq!(wide.result("Criteria_2").unwrap().verdict, Verdict::Correct);

    let missing = report.submission("Missing").unwrap();
    assert_eq!(missing.status, SubmissionStatus::Graded);
    for result in &missing.results {
        assert_eq!(result.verdict, Verdict::ImportError);
        assert_eq!(result.note, IMPORT_ERROR_NOTE);
        assert!(result.detail.as_deref().unwrap().starts_with("file not found"));
    }
}

#[test]
fn missing_sheet_only_affects_its_criterion() {
    let dir = setup_test_dir();
    answer_key(dir.path());
    write_sheet(dir.path(), "partial", "Criteria_1", CONTACTS);

    let config = contacts_config(dir.path(), r#"{ "label": "Partial", "path": "partial" }"#);
    let report = GradingJob::from_config(config)
        .unwrap()
        .grade_submissions()
        .unwrap();

    let partial = report.submission("Partial").unwrap();
    assert_eq!(partial.result("Criteria_1").unwrap().verdict, Verdict::Correct);
    let second = partial.result("Criteria_2").unwrap();
    assert_eq!(second.verdict, Verdict::ImportError);
    assert!(second.detail.as_deref().unwrap().contains("Criteria_2"));
    assert_eq!(partial.score, 50);
}

#[test]
fn optional_missing_submission_is_skipped() {
    let dir = setup_test_dir();
    answer_key(dir.path());

    let config = contacts_config(dir.path(), r#"{ "label": "Python", "path": "nothing_here" }"#);
    let report = GradingJob::from_config(config)
        .unwrap()
        .grade_submissions()
        .unwrap();

    let python = report.submission("Python").unwrap();
    assert_eq!(python.status, SubmissionStatus::Skipped);
    assert!(python.results.is_empty());
}

#[test]
fn malformed_sheet_is_import_error() {
    let dir = setup_test_dir();
    answer_key(dir.path());
    write_sheet(dir.path(), "ragged", "Criteria_1", "id,phone\n1,555-0100,1 Main St\n");
    write_sheet(dir.path(), "ragged", "Criteria_2", "phone,addr\n555-0100,1 Main St\n");

    let config = contacts_config(dir.path(), r#"{ "label": "Ragged", "path": "ragged" }"#);
    let report = GradingJob::from_config(config)
        .unwrap()
        .grade_submissions()
        .unwrap();

    let ragged = report.submission("Ragged").unwrap();
    assert!(
        ragged
            .results
            .iter()
            .all(|r| r.verdict == Verdict::ImportError)
    );
}

#[test]
fn membership_scenario_with_exported_index() {
    let dir = setup_test_dir();
    write_sheet(
        dir.path(),
        "answer_key",
        "Medications",
        "prod_ai\ndrugA\ndrugB\ndrugC\n",
    );
    write_csv_file(
        dir.path(),
        "too_few.csv",
        "Unnamed: 0,prod_ai\n0,drugA\n1,drugB\n2,drugA\n",
    );
    write_csv_file(dir.path(), "too_many.csv", "prod_ai\ndrugA\ndrugB\ndrugC\ndrugD\n");
    write_csv_file(dir.path(), "mixed.csv", "prod_ai\ndrugA\ndrugB\ndrugX\n");

    let raw = r#"{
        "assignment": "FAERS",
        "solution": { "path": "answer_key" },
        "criteria": [
            { "id": "Medications", "sheet": "Medications", "method": "membership",
              "value_column": "prod_ai" }
        ],
        "submissions": [
            { "label": "Python", "path": "too_few.csv" },
            { "label": "R", "path": "too_many.csv" },
            { "label": "General", "path": "mixed.csv" }
        ]
    }"#;
    let path = dir.path().join("faers.json");
    fs::write(&path, raw).unwrap();

    let job = GradingJob::from_config(GradingConfig::load(&path).unwrap()).unwrap();
    let report = job.grade_submissions().unwrap();

    let python = report.submission("Python").unwrap().result("Medications").unwrap();
    assert_eq!(python.verdict, Verdict::TooFew);
    assert_eq!(python.remark, INDEX_NOTE);
    let comparison = python.comparison.as_ref().unwrap();
    assert_eq!(comparison.missing_values, vec!["drugC"]);
    assert_eq!(comparison.candidate_shape.columns, 1);

    let r = report.submission("R").unwrap().result("Medications").unwrap();
    assert_eq!(r.verdict, Verdict::TooMany);
    assert!(r.remark.is_empty());

    let general = report.submission("General").unwrap().result("Medications").unwrap();
    assert_eq!(general.verdict, Verdict::SetMismatch);

    assert_eq!(report.references[0].values, vec!["drugA", "drugB", "drugC"]);

    let written = report.write_sheets(&dir.path().join("results")).unwrap();
    assert_eq!(written.len(), 4);
    assert!(
        dir.path()
            .join("results/Medications reference values.csv")
            .is_file()
    );
}

#[test]
fn bmi_cohort_answer_key_grades_submission() {
    let dir = setup_test_dir();
    write_sheet(
        dir.path(),
        "BMI_Data",
        "HeightWeight",
        "ID,Age,Height (cm),Weight (kg)\n1,65,170,95\n2,40,180,70\n3,70,160,92\n4,30,175,110\n",
    );
    write_sheet(
        dir.path(),
        "BMI_Data",
        "Contact Info",
        "ID,PhoneNo,Address\n1,555-0100,1 Main St\n2,555-0200,2 Oak St\n\
         3,555-0300,3 Pine St\n4,555-0400,4 Elm St\n",
    );
    // Submitted out of order, with a trailing blank row as R exports often have.
    write_sheet(
        dir.path(),
        "BMI_Solution_R",
        "Criteria_3",
        "ID,PhoneNo,Address\n3,555-0300,3 Pine St\n1,555-0100,1 Main St\n,,\n",
    );

    let raw = r#"{
        "assignment": "BMI Risk Factors",
        "solution": { "path": "BMI_Data" },
        "criteria": [
            { "id": "Criteria_3", "sheet": "Criteria_3", "key_column": "ID",
              "compared_columns": ["PhoneNo", "Address"],
              "reference": { "kind": "bmi_cohort", "min_bmi": 30, "min_age": 60 } },
            { "id": "Criteria_4", "sheet": "Criteria_4", "key_column": "ID",
              "compared_columns": ["PhoneNo", "Address"],
              "reference": { "kind": "bmi_cohort", "min_bmi": 35, "min_age": 60 } }
        ],
        "submissions": [ { "label": "R Submission", "path": "BMI_Solution_R" } ]
    }"#;
    let path = dir.path().join("bmi.json");
    fs::write(&path, raw).unwrap();

    let job = GradingJob::from_config(GradingConfig::load(&path).unwrap()).unwrap();
    let report = job.grade_submissions().unwrap();
    let r = report.submission("R Submission").unwrap();

    assert_eq!(r.result("Criteria_3").unwrap().verdict, Verdict::Correct);
    assert_eq!(r.result("Criteria_4").unwrap().verdict, Verdict::ImportError);
}

#[test]
fn unknown_reference_column_aborts_before_grading() {
    let dir = setup_test_dir();
    write_sheet(dir.path(), "answer_key", "Criteria_1", "id,phone\n1,555\n");
    write_sheet(dir.path(), "answer_key", "Criteria_2", CONTACTS);
    let config = contacts_config(dir.path(), "");

    assert!(matches!(
        GradingJob::from_config(config),
        Err(MarkerError::InvalidConfig(_))
    ));
}

#[test]
fn instructor_overrides_replace_default_notes() {
    let dir = setup_test_dir();
    answer_key(dir.path());
    write_sheet(dir.path(), "short", "Criteria_1", "id,phone,addr\n1,555-0100,1 Main St\n");
    write_sheet(dir.path(), "short", "Criteria_2", "id,phone,addr\n1,555-0100,1 Main St\n");

    let mut config = contacts_config(dir.path(), r#"{ "label": "Short", "path": "short" }"#);
    config
        .feedback
        .overrides
        .insert("row_count_mismatch".into(), "Check your BMI filter.".into());
    config.criteria[1]
        .feedback
        .insert("row_count_mismatch".into(), "Did you apply the age filter?".into());

    let report = GradingJob::from_config(config)
        .unwrap()
        .grade_submissions()
        .unwrap();
    let short = report.submission("Short").unwrap();
    assert_eq!(short.result("Criteria_1").unwrap().note, "Check your BMI filter.");
    assert_eq!(
        short.result("Criteria_2").unwrap().note,
        "Did you apply the age filter?"
    );
}

struct LabelledFeedback;

impl Feedback for LabelledFeedback {
    fn note(&self, context: &FeedbackContext<'_>, verdict: Verdict) -> String {
        if verdict.is_correct() {
            String::new()
        } else {
            format!("{}: {}", context.criterion, verdict)
        }
    }
}

#[test]
fn custom_feedback_strategy_writes_notes() {
    let dir = setup_test_dir();
    answer_key(dir.path());
    write_sheet(dir.path(), "short", "Criteria_1", "id,phone,addr\n1,555-0100,1 Main St\n");
    write_sheet(dir.path(), "short", "Criteria_2", CONTACTS);

    let config = contacts_config(dir.path(), r#"{ "label": "Short", "path": "short" }"#);
    let job = GradingJob::from_config(config)
        .unwrap()
        .with_feedback(LabelledFeedback);
    assert_eq!(job.config().assignment, "Contacts");
    assert_eq!(job.answer_key().len(), 2);
    assert_eq!(job.answer_key().get("Criteria_1").unwrap().row_count(), 2);

    let report = job.grade_submissions().unwrap();
    let short = report.submission("Short").unwrap();
    assert_eq!(
        short.result("Criteria_1").unwrap().note,
        "Criteria_1: RowCountMismatch"
    );
    assert_eq!(short.result("Criteria_2").unwrap().note, "");
}
