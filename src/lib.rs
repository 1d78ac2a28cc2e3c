//! Extract statically-known object literals from JS/TS source.
//!
//! ```
//! use dictify_js::{parse_string, Value};
//!
//! let bindings = parse_string("const config = { port: 8080, hosts: ['a', 'b'], onReady() {} };").unwrap();
//! let config = &bindings["config"];
//!
//! assert_eq!(config.get("port"), Some(&Value::Integer(8080)));
//! assert_eq!(config.get("onReady"), None);
//! ```
pub mod ast;
pub mod collector;
pub mod convert;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{ParsedValue, Token};
pub use collector::Collector;
pub use lexer::{LexError, Lexer, Position};
pub use options::Options;
pub use parser::{ParseError, Parser};
pub use value::Value;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced to callers of [`parse_string`] and [`parse_file`].
///
/// Malformed or unsupported literals are never reported; they are dropped.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Extract object-literal bindings from in-memory source.
pub fn parse_string(source: &str) -> Result<HashMap<String, Value>, Error> {
    parse_string_with(source, &Options::default())
}

pub fn parse_string_with(source: &str, options: &Options) -> Result<HashMap<String, Value>, Error> {
    Ok(Collector::new(options).collect(source)?)
}

/// Read a UTF-8 file and extract its object-literal bindings.
pub fn parse_file(path: impl AsRef<Path>) -> Result<HashMap<String, Value>, Error> {
    parse_file_with(path, &Options::default())
}

pub fn parse_file_with(
    path: impl AsRef<Path>,
    options: &Options,
) -> Result<HashMap<String, Value>, Error> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_string_with(&source, options)
}
