//!
//! Traits Module
//!
//! Core traits used throughout the marker system for extensibility.
//!
//! - [`comparator`]: how a candidate dataset is compared with a reference.
//! - [`feedback`]: how a verdict becomes a student-facing note.

pub mod comparator;
pub mod feedback;
