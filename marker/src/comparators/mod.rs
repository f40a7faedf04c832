//! # Comparators
//!
//! This module provides the comparators used to grade a submitted dataset against
//! its reference. Both implement the [`Comparator`](crate::traits::comparator::Comparator)
//! trait, so a grading job can pick one per criterion from configuration.
//!
//! The available comparators are:
//! - [`row_set_comparator`]: Aligns both datasets on a key column and compares cells.
//! - [`membership_comparator`]: Compares the sets of distinct values in one column.

pub mod membership_comparator;
pub mod row_set_comparator;
