//! Run the extractor over files or piped source

use super::CliError;
use crate::{parse_file_with, parse_string_with, value::bindings_to_json, Options};
use regex::Regex;
use std::path::PathBuf;

/// Where the source text comes from
#[derive(Debug, Clone)]
pub enum Input {
    /// Source already read (e.g. from stdin)
    Source(String),
    /// One or more files
    Files(Vec<PathBuf>),
}

/// Options for the extract command
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub input: Option<Input>,
    /// Regex binding names must match
    pub only: Option<String>,
    /// Override the nesting ceiling
    pub max_depth: Option<usize>,
    /// Collect declarations below file scope too
    pub nested: bool,
}

impl ExtractOptions {
    fn to_options(&self) -> Result<Options, CliError> {
        let mut options = Options::new().nested_declarations(self.nested);
        if let Some(depth) = self.max_depth {
            options = options.max_depth(depth);
        }
        if let Some(pattern) = &self.only {
            options = options.name_filter(Regex::new(pattern)?);
        }
        Ok(options)
    }
}

/// Extract bindings as JSON.
///
/// A single input yields the binding object itself; several files yield an
/// object keyed by path.
pub fn execute_extract(options: &ExtractOptions) -> Result<serde_json::Value, CliError> {
    let input = options.input.as_ref().ok_or(CliError::NoInput)?;
    let parse_options = options.to_options()?;

    match input {
        Input::Source(source) => Ok(bindings_to_json(parse_string_with(source, &parse_options)?)),
        Input::Files(paths) => match paths.as_slice() {
            [] => Err(CliError::NoInput),
            [path] => Ok(bindings_to_json(parse_file_with(path, &parse_options)?)),
            paths => {
                let mut by_file = serde_json::Map::new();
                for path in paths {
                    let bindings = parse_file_with(path, &parse_options)?;
                    by_file.insert(path.display().to_string(), bindings_to_json(bindings));
                }
                Ok(serde_json::Value::Object(by_file))
            }
        },
    }
}
