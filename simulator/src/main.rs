use anyhow::{Context, Result};
use simulator::Simulation;
use simulator::catalog::Catalog;
use std::path::{Path, PathBuf};
use util::config::AppConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::global().clone();
    init_logging(&config);

    let catalog = match &config.medication_catalog {
        Some(path) => Catalog::from_csv(Path::new(path))
            .with_context(|| format!("loading medication catalog {path}"))?,
        None => Catalog::builtin(),
    };

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.simulation_output_dir));

    let simulation = Simulation::new(catalog, config.simulation_seed);
    println!(
        "Simulating {} medications across {} machines (seed {})",
        simulation.catalog().len(),
        simulation.machines().len(),
        config.simulation_seed
    );

    let files = simulation
        .run(&out_dir)
        .with_context(|| format!("writing simulated data to {}", out_dir.display()))?;

    println!("Wrote {} files to {}", files.len(), out_dir.display());
    Ok(())
}

fn init_logging(config: &AppConfig) {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(format!("simulator={}", config.log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
