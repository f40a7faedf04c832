use anyhow::{Context, Result};
use marker::GradingJob;
use marker::report::SubmissionStatus;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::rolling;
use util::config::AppConfig;
use util::grading_config::GradingConfig;

fn main() -> Result<()> {
    // Load configuration and initialize logging
    let app_config = AppConfig::global().clone();
    let _log_guard = init_logging(&app_config);

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&app_config.grading_config));

    let grading = GradingConfig::load(&config_path)
        .with_context(|| format!("loading grading config {}", config_path.display()))?;

    info!(
        env = %app_config.env,
        config = %config_path.display(),
        "starting {}",
        app_config.project_name
    );

    let job = GradingJob::from_config(grading).context("building the answer key")?;
    let results_dir = job
        .config()
        .output
        .results_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&app_config.results_dir));
    let report_path = results_dir.join(&job.config().output.report_file);

    println!(
        "Starting {}: grading {} ({} criteria, {} reference datasets)",
        app_config.project_name,
        job.config().assignment,
        job.config().criteria.len(),
        job.answer_key().len()
    );

    let report = job.grade_submissions().context("grading submissions")?;

    for table in &report.submissions {
        match table.status {
            SubmissionStatus::Skipped => println!("No {} file found", table.submission),
            SubmissionStatus::Graded => {
                println!("{}: {}% correct", table.submission, table.score);
                for result in &table.results {
                    println!("  {:<20} {}", result.criterion, result.verdict);
                }
            }
        }
    }

    let sheets = report
        .write_sheets(&results_dir)
        .with_context(|| format!("writing results to {}", results_dir.display()))?;
    report
        .write_json(&report_path)
        .with_context(|| format!("writing report {}", report_path.display()))?;

    info!(
        sheets = sheets.len(),
        report = %report_path.display(),
        "grading run finished"
    );
    println!("Exporting results to {}", results_dir.display());
    Ok(())
}

fn init_logging(config: &AppConfig) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all(&config.log_dir).ok();

    let file_appender = rolling::daily(&config.log_dir, &config.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true);

    let env_filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(format!("checker={0},marker={0}", config.log_level)));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config.log_to_stdout {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
