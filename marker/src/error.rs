//! Marker Error Types
//!
//! This module defines the [`MarkerError`] enum, which covers every way loading,
//! comparing or reporting a dataset can fail.
//!
//! Load failures (`FileNotFound`, `SheetNotFound`, `Malformed`, `MissingColumn`,
//! `Io`) are recoverable per criterion: a grading job turns them into an
//! `ImportError` verdict and keeps going. `InvalidConfig` means the answer key or
//! the grading configuration itself is wrong and the run should stop.
//!
//! # Example
//!
//! ```rust
//! use marker::error::MarkerError;
//!
//! let err = MarkerError::SheetNotFound {
//!     workbook: "BMI_Solution_R".into(),
//!     sheet: "Criteria_3".into(),
//! };
//! assert!(err.is_load_failure());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Represents all error types that can occur in the marker system.
#[derive(Debug, Error)]
pub enum MarkerError {
    /// The workbook (file or directory) does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The workbook exists but has no sheet with the requested name.
    #[error("sheet `{sheet}` not found in {}", .workbook.display())]
    SheetNotFound { workbook: PathBuf, sheet: String },

    /// The sheet exists but could not be parsed into a dataset.
    #[error("malformed content in {location}: {reason}")]
    Malformed { location: String, reason: String },

    /// A dataset lacks a column the comparison needs.
    #[error("column `{column}` missing from {dataset}")]
    MissingColumn { dataset: String, column: String },

    /// I/O error while reading or writing (unreadable file, permission denied, ...).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The answer key or grading configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Results could not be serialized.
    #[error("failed to serialize results: {0}")]
    Serialize(String),
}

impl MarkerError {
    /// Whether this error describes a submission that could not be loaded, as
    /// opposed to a problem on the instructor side.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            MarkerError::FileNotFound(_)
                | MarkerError::SheetNotFound { .. }
                | MarkerError::Malformed { .. }
                | MarkerError::MissingColumn { .. }
                | MarkerError::Io(_)
        )
    }
}

impl From<csv::Error> for MarkerError {
    fn from(err: csv::Error) -> Self {
        let location = err
            .position()
            .map(|p| format!("line {}", p.line()))
            .unwrap_or_else(|| "csv".to_string());
        MarkerError::Malformed {
            location,
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MarkerError {
    fn from(err: serde_json::Error) -> Self {
        MarkerError::Serialize(err.to_string())
    }
}
