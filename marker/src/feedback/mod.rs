//! # Feedback Strategies Module
//!
//! This module provides pluggable feedback strategies for the marker system.
//! Each strategy implements the [`Feedback`](crate::traits::feedback::Feedback) trait
//! and turns a verdict into the note shown next to it in the results table.
//!
//! ## Available Strategies
//!
//! - [`auto_feedback`]: Fixed notes per verdict.
//! - [`manual_feedback`]: Instructor-specified notes from the grading configuration,
//!   falling back to the automatic ones.

pub mod auto_feedback;
pub mod manual_feedback;
