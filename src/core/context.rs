//! Pipeline context - working state threaded through the stages of one run

use crate::core::{manifest::ManifestRecorder, pipeline::Stage};
use crate::engine::BundleOutput;
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

/// State accumulated while one pipeline runs.
///
/// Created fresh for every run and dropped at the end, together with any
/// staging directory the transform stage created.
#[derive(Debug)]
pub struct PipelineContext {
    /// Build this run belongs to
    pub run_id: Uuid,

    /// Staged entry written by transform; bundle resolves the spec entry
    /// when this is unset
    pub entry: Option<PathBuf>,

    /// Scratch directory for intermediate files
    pub staging: Option<TempDir>,

    /// What the bundler produced, waiting to be emitted
    pub outputs: Vec<BundleOutput>,

    /// Artifacts written into the output directory
    pub artifacts: Vec<PathBuf>,

    /// Stale entries removed by the clean stage
    pub removed: Vec<PathBuf>,

    pub recorder: ManifestRecorder,

    /// Set once the manifest has been flushed
    pub manifest_path: Option<PathBuf>,

    /// Stages finished so far, in order
    pub completed: Vec<Stage>,
}

impl PipelineContext {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            entry: None,
            staging: None,
            outputs: Vec::new(),
            artifacts: Vec::new(),
            removed: Vec::new(),
            recorder: ManifestRecorder::new(),
            manifest_path: None,
            completed: Vec::new(),
        }
    }

    pub fn has_completed(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }

    /// Staging directory, created on first use
    pub fn staging_dir(&mut self) -> std::io::Result<PathBuf> {
        if self.staging.is_none() {
            self.staging = Some(tempfile::Builder::new().prefix("assetter-").tempdir()?);
        }
        match &self.staging {
            Some(dir) => Ok(dir.path().to_path_buf()),
            None => Err(std::io::Error::other("staging directory unavailable")),
        }
    }
}
