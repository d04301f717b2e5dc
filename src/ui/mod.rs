//! ui
//!
//! User-facing output helpers.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware printing

pub mod output;
