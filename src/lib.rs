//! assetter - content-hashed script and style bundles with manifests

pub mod cli;
pub mod core;
pub mod engine;
pub mod execution;

// Re-export commonly used types
pub use crate::core::{
    BuildError, BuildParameters, BuildResult, BuildSummary, ExecutionStatus, Manifest,
    PipelineKind, PipelineSpec, RunReport, Stage,
};
pub use crate::engine::{Bundler, EngineError, EsbuildClient, TailwindClient, UtilityGenerator};
pub use crate::execution::{ExecutionEvent, PipelineRunner, SchedulingStrategy};
