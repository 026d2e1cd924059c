//! Build parameters supplied at invocation

use crate::core::error::BuildError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The three roots a build is invoked with.
///
/// Existence of the paths is not checked here; a missing entry or config
/// file surfaces as a failure of the pipeline that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParameters {
    /// Source tree containing `scripts/main.*` and `styles/main.css`
    pub entry_root: PathBuf,

    /// Directory holding the style tool configuration
    pub config_root: PathBuf,

    /// Root under which hashed artifacts and manifests are written
    pub output_root: PathBuf,
}

impl BuildParameters {
    /// Create a parameter set, rejecting empty paths
    pub fn new(
        entry_root: impl Into<PathBuf>,
        config_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Result<Self, BuildError> {
        let params = Self {
            entry_root: entry_root.into(),
            config_root: config_root.into(),
            output_root: output_root.into(),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_entry_root(mut self, entry_root: impl Into<PathBuf>) -> Self {
        self.entry_root = entry_root.into();
        self
    }

    pub fn with_config_root(mut self, config_root: impl Into<PathBuf>) -> Self {
        self.config_root = config_root.into();
        self
    }

    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// Check that none of the roots is empty
    pub fn validate(&self) -> Result<(), BuildError> {
        for (name, path) in [
            ("entry root", &self.entry_root),
            ("config root", &self.config_root),
            ("output root", &self.output_root),
        ] {
            if is_blank(path) {
                return Err(BuildError::InvalidParameters(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}
