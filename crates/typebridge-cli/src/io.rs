use std::io::Write;
use std::path::PathBuf;

use crate::error::{convert_io_error, CliError};

pub fn read_file(path: PathBuf) -> Result<String, CliError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| convert_io_error(e, path))?;
    Ok(contents)
}

/// Writes the generated source to `output`, or to stdout when absent.
pub fn write_output(output: Option<PathBuf>, source: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(&path, source).map_err(|source| CliError::WriteError { path, source }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(source.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|source| CliError::WriteError {
                    path: PathBuf::from("<stdout>"),
                    source,
                })
        }
    }
}
