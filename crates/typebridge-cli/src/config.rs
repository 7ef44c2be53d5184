//! `typebridge.toml`: project settings that command-line flags override.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use typebridge_codegen::EmitConfig;

use crate::error::CliError;
use crate::io::read_file;

/// Config file picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "typebridge.toml";

/// Program dump read when neither the flag nor the config names one.
pub const DEFAULT_PROGRAM: &str = "program.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where the checked program comes from
    pub input: InputConfig,

    /// How bindings are emitted
    pub emit: EmitConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Path of the JSON program dump, relative to the working directory
    pub program: Option<PathBuf>,
}

impl CliConfig {
    /// Loads `explicit` if given, else `typebridge.toml` if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, CliError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(CONFIG_FILE_NAME);
                if path.is_file() {
                    Self::load(path)
                } else {
                    debug!("no {} found, using defaults", CONFIG_FILE_NAME);
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let contents = read_file(path.to_path_buf())?;
        let config = toml::from_str(&contents).map_err(|source| CliError::ConfigError {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// The program dump to read: the flag, then the config, then [`DEFAULT_PROGRAM`].
    pub fn program_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.input.program.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM))
    }
}
