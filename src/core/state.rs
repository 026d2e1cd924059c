//! Per-pipeline results and the pair returned by a build

use crate::core::{error::BuildError, pipeline::PipelineKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Final status of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Pipeline completed successfully
    Completed,
    /// Pipeline failed
    Failed,
}

/// What a successful pipeline left on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSummary {
    pub kind: PipelineKind,

    /// Hashed artifacts written this run, source maps included
    pub artifacts: Vec<PathBuf>,

    pub manifest_path: PathBuf,

    /// Number of stale entries removed before writing
    pub removed: usize,

    pub started_at: DateTime<Utc>,

    pub completed_at: DateTime<Utc>,
}

impl BuildSummary {
    pub fn duration(&self) -> chrono::Duration {
        self.completed_at.signed_duration_since(self.started_at)
    }
}

/// Outcome of one pipeline, independent of the other
#[derive(Debug)]
pub enum BuildResult {
    Success(BuildSummary),
    Failure(BuildError),
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Success(_))
    }

    pub fn status(&self) -> ExecutionStatus {
        match self {
            BuildResult::Success(_) => ExecutionStatus::Completed,
            BuildResult::Failure(_) => ExecutionStatus::Failed,
        }
    }

    pub fn summary(&self) -> Option<&BuildSummary> {
        match self {
            BuildResult::Success(summary) => Some(summary),
            BuildResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&BuildError> {
        match self {
            BuildResult::Success(_) => None,
            BuildResult::Failure(error) => Some(error),
        }
    }
}

impl From<Result<BuildSummary, BuildError>> for BuildResult {
    fn from(result: Result<BuildSummary, BuildError>) -> Self {
        match result {
            Ok(summary) => BuildResult::Success(summary),
            Err(error) => BuildResult::Failure(error),
        }
    }
}

/// The two independent pipeline results of one build
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub scripts: BuildResult,
    pub styles: BuildResult,
}

impl RunReport {
    pub fn result(&self, kind: PipelineKind) -> &BuildResult {
        match kind {
            PipelineKind::Scripts => &self.scripts,
            PipelineKind::Styles => &self.styles,
        }
    }

    /// Process exit code derived from both results
    pub fn exit_code(&self) -> i32 {
        if self.scripts.is_success() && self.styles.is_success() {
            0
        } else {
            1
        }
    }
}
