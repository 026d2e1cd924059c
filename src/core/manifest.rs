//! Manifest recording - logical asset names to hashed output paths

use crate::core::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the manifest inside a pipeline's output directory
pub const MANIFEST_FILENAME: &str = "manifest.json";

const SOURCE_MAP_SUFFIX: &str = ".map";

/// A flat `logical name -> hashed path` mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Load a manifest written by a previous flush
    pub fn read(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn get(&self, logical: &str) -> Option<&str> {
        self.entries.get(logical).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Hashed paths of every asset except source maps.
    ///
    /// When `strip_prefix` is given, values starting with it are returned
    /// relative to it, e.g. to turn `public/scripts/main-1a2b.js` into a
    /// URL path.
    pub fn asset_paths(&self, strip_prefix: Option<&str>) -> Vec<String> {
        self.entries
            .values()
            .filter(|path| !path.ends_with(SOURCE_MAP_SUFFIX))
            .map(|path| match strip_prefix {
                Some(prefix) => path
                    .strip_prefix(prefix)
                    .unwrap_or(path)
                    .to_string(),
                None => path.clone(),
            })
            .collect()
    }
}

/// Accumulates entries during a pipeline run and persists them once
#[derive(Debug, Default)]
pub struct ManifestRecorder {
    manifest: Manifest,
}

impl ManifestRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one artifact. A repeated key keeps the latest path.
    pub fn record(&mut self, logical: impl Into<String>, hashed_path: impl Into<String>) {
        self.manifest
            .entries
            .insert(logical.into(), hashed_path.into());
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Write `manifest.json` into `output_dir`, replacing any previous one
    pub async fn flush(&self, output_dir: &Path) -> Result<PathBuf, BuildError> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| BuildError::io(output_dir, e))?;

        let path = output_dir.join(MANIFEST_FILENAME);
        let json = serde_json::to_string_pretty(&self.manifest)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| BuildError::io(&path, e))?;

        debug!(
            "Wrote manifest with {} entries to {}",
            self.manifest.len(),
            path.display()
        );
        Ok(path)
    }
}
