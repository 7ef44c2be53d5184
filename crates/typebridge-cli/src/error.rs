use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;
use typebridge_codegen::CodegenError;
use typebridge_symbols::LoadError;

/// Errors surfaced by the `typebridge` binary
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Failed to read file {path}")]
    #[diagnostic(code(typebridge::cli::io_error))]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write bindings to {path}")]
    #[diagnostic(code(typebridge::cli::write_error))]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}")]
    #[diagnostic(
        code(typebridge::cli::config_error),
        help("see the [input] and [emit] tables accepted by typebridge.toml")
    )]
    ConfigError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Program has {count} diagnostic(s); no bindings were generated")]
    #[diagnostic(code(typebridge::cli::program_diagnostics))]
    ProgramDiagnostics { count: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Codegen(#[from] CodegenError),
}

/// Convert IO errors with context
pub fn convert_io_error(error: std::io::Error, path: PathBuf) -> CliError {
    CliError::IoError { path, source: error }
}
