//! CLI support for dictify-js
//!
//! Provides programmatic access to the `dictify` command so other tools can
//! embed it without spawning a process.

mod extract;

pub use extract::{execute_extract, ExtractOptions, Input};

use std::io;
use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Extract(#[from] crate::Error),

    #[error("Invalid --only pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Pass file paths or pipe source to stdin.")]
    NoInput,
}
