//! # Utilities
//!
//! This module contains utility functions shared across the `marker` crate.
//!
//! Currently, this module exports the following sub-module:
//! - [`workbook_loader`]: Reading workbooks (CSV directories or single CSV files) into
//!   datasets and writing datasets back out as sheets.

pub mod workbook_loader;
