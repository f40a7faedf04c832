//! Shared configuration and filesystem helpers for the grading toolkit.

pub mod config;
pub mod grading_config;
pub mod paths;
pub mod test_helpers;
