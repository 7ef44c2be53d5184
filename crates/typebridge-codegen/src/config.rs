use serde::{Deserialize, Serialize};

/// Settings of one emission run; the `[emit]` table of `typebridge.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// Native namespace wrapping all generated declarations
    pub namespace: String,

    /// Replace symbols that cannot be emitted with a comment instead of
    /// aborting the run
    pub keep_going: bool,
}

pub const DEFAULT_NAMESPACE: &str = "tc::js";

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            keep_going: false,
        }
    }
}
