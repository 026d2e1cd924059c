//! Engine error types

use std::path::PathBuf;
use thiserror::Error;

/// Error types for the external bundling and transform engines
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to start {engine}: {source}")]
    Spawn {
        engine: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{engine} exited with code {code}: {stderr}")]
    Failed {
        engine: String,
        code: i32,
        stderr: String,
    },

    #[error("{engine} timed out after {secs} seconds")]
    Timeout { engine: String, secs: u64 },

    #[error("Style config not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("CSS transform error: {0}")]
    Transform(String),

    #[error("Unexpected engine output: {0}")]
    Output(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
