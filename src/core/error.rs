//! Error types for a pipeline run

use crate::core::pipeline::Stage;
use crate::engine::EngineError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can end a pipeline run
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid build parameters: {0}")]
    InvalidParameters(String),

    #[error("Entry file not found: {}", .0.display())]
    EntryNotFound(PathBuf),

    #[error("Invalid naming template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Invalid stage order: {0}")]
    StageOrder(String),

    #[error("Stage {stage} ran before its input was ready")]
    MissingInput { stage: Stage },

    #[error("Two outputs share the asset name '{0}'")]
    DuplicateAsset(String),

    #[error("Invalid cleanup pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Invalid source map: {0}")]
    SourceMap(#[source] serde_json::Error),

    #[error("Pipeline panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl BuildError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}
