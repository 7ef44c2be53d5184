use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::LoadError;
use crate::graph::Program;

/// Source of a type-checked program.
///
/// The generator never parses or checks interface descriptions itself; it
/// receives the finished symbol graph through this seam.
pub trait ProgramLoader {
    fn load(&self) -> Result<Program, LoadError>;
}

/// Loads the JSON program dump written by the checker export step.
#[derive(Debug, Clone)]
pub struct DumpLoader {
    path: PathBuf,
}

impl DumpLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses and validates dump text that was read from `path`.
    pub fn parse(path: &Path, text: &str) -> Result<Program, LoadError> {
        let program: Program = serde_json::from_str(text).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        program.validate()?;
        debug!(
            "loaded {} ({} source files, {} symbols, {} diagnostics)",
            path.display(),
            program.source_files().len(),
            program.symbol_count(),
            program.diagnostics().len()
        );
        Ok(program)
    }
}

impl ProgramLoader for DumpLoader {
    fn load(&self) -> Result<Program, LoadError> {
        let text = fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        Self::parse(&self.path, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_dump() {
        let text = r#"{
            "source_files": [{ "file_name": "a.d.ts", "symbol": 0 }],
            "symbols": [{ "name": "\"a\"", "flags": 512, "declarations": [0] }],
            "declarations": [{ "kind": "source_file" }]
        }"#;
        let program = DumpLoader::parse(Path::new("a.json"), text).unwrap();
        assert_eq!(program.symbol_count(), 1);
        assert_eq!(program.source_files()[0].file_name, "a.d.ts");
    }

    #[test]
    fn test_dangling_reference_is_rejected() {
        let text = r#"{
            "source_files": [{ "file_name": "a.d.ts", "symbol": 3 }]
        }"#;
        let err = DumpLoader::parse(Path::new("a.json"), text).unwrap_err();
        match err {
            LoadError::DanglingReference { table, index, .. } => {
                assert_eq!(table, "symbol");
                assert_eq!(index, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parent_cycle_is_rejected() {
        let text = r#"{
            "symbols": [
                { "name": "A", "flags": 32, "parent": 1 },
                { "name": "B", "flags": 32, "parent": 0 }
            ]
        }"#;
        let err = DumpLoader::parse(Path::new("a.json"), text).unwrap_err();
        assert!(matches!(err, LoadError::ParentCycle { index: 0, .. }), "{err}");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = DumpLoader::parse(Path::new("a.json"), "{ not json").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
