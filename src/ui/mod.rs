//! ui
//!
//! Terminal output helpers.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! Command results go to stdout; warnings and errors go to stderr.

pub mod output;
