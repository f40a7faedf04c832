use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while generating the synthetic dispensing data.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The medication catalog exists but cannot be used.
    #[error("invalid medication catalog {}: {reason}", .path.display())]
    Catalog { path: PathBuf, reason: String },
}
