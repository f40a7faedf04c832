use crate::error::SimulationError;
use colored::*;
use rand::rngs::StdRng;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const STATUS_COLUMN: usize = 80;

/// A file written by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub rows: usize,
}

pub trait Generator {
    fn generate(&self, out_dir: &Path, rng: &mut StdRng) -> Result<GeneratedFile, SimulationError>;
}

/// Run one generator, printing a progress line with its outcome and timing.
pub fn run_generator<G: Generator + ?Sized>(
    generator: &G,
    name: &str,
    out_dir: &Path,
    rng: &mut StdRng,
) -> Result<GeneratedFile, SimulationError> {
    let base_msg = format!("Generating {}", name.bold());
    let dots = ".".repeat(STATUS_COLUMN.saturating_sub(base_msg.len()));
    print!("{}{} ", base_msg, dots);
    io::stdout().flush().ok();

    let start = Instant::now();
    match generator.generate(out_dir, rng) {
        Ok(file) => {
            let detail = format!("({} rows, {:.2?})", file.rows, start.elapsed()).dimmed();
            println!("{} {}", "done".green(), detail);
            Ok(file)
        }
        Err(e) => {
            println!("{}", "failed".red());
            Err(e)
        }
    }
}
