use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while bringing a checked program into memory.
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("Failed to read program dump {path}")]
    #[diagnostic(code(typebridge::symbols::io_error))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed program dump {path}")]
    #[diagnostic(
        code(typebridge::symbols::parse_error),
        help("the dump must be the JSON object written by the checker export step")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{owner} refers to {table} #{index}, which does not exist")]
    #[diagnostic(code(typebridge::symbols::dangling_reference))]
    DanglingReference {
        table: &'static str,
        index: usize,
        owner: String,
    },

    #[error("symbol #{index} `{name}` is its own ancestor")]
    #[diagnostic(
        code(typebridge::symbols::parent_cycle),
        help("parent links must form a tree rooted at source file or global symbols")
    )]
    ParentCycle { index: usize, name: String },
}
