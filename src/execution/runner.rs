//! Pipeline runner - orchestrates the script and style pipelines of a build

use crate::{
    core::{
        config::BuildConfig, BuildError, BuildParameters, BuildResult, BuildSummary,
        ExecutionStatus, PipelineContext, PipelineKind, PipelineSpec, RunReport, Stage,
    },
    engine::{Bundler, Prefixer, StyleTransformChain, UtilityGenerator},
    execution::{SchedulingStrategy, StageExecutor},
};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};
use uuid::Uuid;

/// Events that can occur during a build
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    BuildStarted {
        run_id: Uuid,
        params: BuildParameters,
    },
    PipelineStarted {
        kind: PipelineKind,
    },
    StageStarted {
        kind: PipelineKind,
        stage: Stage,
    },
    StageCompleted {
        kind: PipelineKind,
        stage: Stage,
    },
    PipelineSucceeded {
        kind: PipelineKind,
        manifest_path: PathBuf,
        artifacts: Vec<PathBuf>,
    },
    PipelineFailed {
        kind: PipelineKind,
        error: String,
    },
    BuildFinished {
        run_id: Uuid,
        scripts: ExecutionStatus,
        styles: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Runs both pipelines of a build, isolating each from the other's failure
pub struct PipelineRunner<B, G> {
    executor: Arc<StageExecutor<B, G>>,
    strategy: SchedulingStrategy,
    event_handlers: Arc<Vec<EventHandler>>,
}

impl<B, G> Clone for PipelineRunner<B, G> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            strategy: self.strategy,
            event_handlers: self.event_handlers.clone(),
        }
    }
}

impl<B: Bundler + 'static, G: UtilityGenerator + 'static> PipelineRunner<B, G> {
    pub fn new(bundler: B, generator: G, config: &BuildConfig) -> Self {
        let styles = StyleTransformChain::new(generator, Prefixer::new(&config.effective_targets()));
        Self {
            executor: Arc::new(StageExecutor::new(bundler, styles, config.hash_length)),
            strategy: config.strategy,
            event_handlers: Arc::new(Vec::new()),
        }
    }

    pub fn with_strategy(mut self, strategy: SchedulingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.event_handlers).push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in self.event_handlers.iter() {
            handler(event.clone());
        }
    }

    /// Run the script and style pipelines.
    ///
    /// Both always run to completion; a failure in one is reported in its
    /// own result and never stops the other. Each pipeline runs as its own
    /// task, so a panicking engine fails only the pipeline it was called from.
    pub async fn run(&self, params: &BuildParameters) -> RunReport {
        let run_id = Uuid::new_v4();
        info!("Starting build {} ({:?})", run_id, self.strategy);
        self.emit_event(ExecutionEvent::BuildStarted {
            run_id,
            params: params.clone(),
        });

        let (scripts, styles) = match self.strategy {
            SchedulingStrategy::Sequential => {
                let scripts = self.spawn_pipeline(run_id, PipelineKind::Scripts, params);
                let scripts = self.join_pipeline(PipelineKind::Scripts, scripts).await;
                let styles = self.spawn_pipeline(run_id, PipelineKind::Styles, params);
                let styles = self.join_pipeline(PipelineKind::Styles, styles).await;
                (scripts, styles)
            }
            SchedulingStrategy::Concurrent => {
                let scripts = self.spawn_pipeline(run_id, PipelineKind::Scripts, params);
                let styles = self.spawn_pipeline(run_id, PipelineKind::Styles, params);
                tokio::join!(
                    self.join_pipeline(PipelineKind::Scripts, scripts),
                    self.join_pipeline(PipelineKind::Styles, styles),
                )
            }
        };

        self.emit_event(ExecutionEvent::BuildFinished {
            run_id,
            scripts: scripts.status(),
            styles: styles.status(),
        });

        RunReport {
            run_id,
            scripts,
            styles,
        }
    }

    fn spawn_pipeline(
        &self,
        run_id: Uuid,
        kind: PipelineKind,
        params: &BuildParameters,
    ) -> JoinHandle<BuildResult> {
        let runner = self.clone();
        let params = params.clone();
        tokio::spawn(async move { runner.run_pipeline(run_id, kind, &params).await })
    }

    /// Wait for a pipeline task, turning a panic into a failed result
    async fn join_pipeline(&self, kind: PipelineKind, handle: JoinHandle<BuildResult>) -> BuildResult {
        match handle.await {
            Ok(result) => result,
            Err(e) => self.report(kind, Err(BuildError::Panicked(panic_message(e)))),
        }
    }

    /// Run one pipeline built from `params`
    pub async fn run_pipeline(
        &self,
        run_id: Uuid,
        kind: PipelineKind,
        params: &BuildParameters,
    ) -> BuildResult {
        let spec = params
            .validate()
            .and_then(|_| PipelineSpec::for_kind(kind, params));
        match spec {
            Ok(spec) => self.run_spec(run_id, &spec).await,
            Err(e) => {
                self.emit_event(ExecutionEvent::PipelineStarted { kind });
                self.report(kind, Err(e))
            }
        }
    }

    /// Run a pipeline from a prepared `PipelineSpec`
    pub async fn run_spec(&self, run_id: Uuid, spec: &PipelineSpec) -> BuildResult {
        self.emit_event(ExecutionEvent::PipelineStarted { kind: spec.kind });
        let result = self.execute(run_id, spec).await;
        self.report(spec.kind, result)
    }

    async fn execute(&self, run_id: Uuid, spec: &PipelineSpec) -> Result<BuildSummary, BuildError> {
        spec.validate_stages()?;

        let started_at = Utc::now();
        let mut ctx = PipelineContext::new(run_id);

        for stage in &spec.stages {
            self.emit_event(ExecutionEvent::StageStarted {
                kind: spec.kind,
                stage: *stage,
            });
            self.executor.execute(spec, *stage, &mut ctx).await?;
            ctx.completed.push(*stage);
            self.emit_event(ExecutionEvent::StageCompleted {
                kind: spec.kind,
                stage: *stage,
            });
        }

        let manifest_path = ctx
            .manifest_path
            .take()
            .ok_or(BuildError::MissingInput { stage: Stage::Flush })?;

        Ok(BuildSummary {
            kind: spec.kind,
            artifacts: std::mem::take(&mut ctx.artifacts),
            manifest_path,
            removed: ctx.removed.len(),
            started_at,
            completed_at: Utc::now(),
        })
    }

    /// Log and announce a pipeline outcome, turning it into a result
    fn report(&self, kind: PipelineKind, result: Result<BuildSummary, BuildError>) -> BuildResult {
        match &result {
            Ok(summary) => {
                info!(
                    "{} pipeline finished: {} artifact(s) in {}ms",
                    kind,
                    summary.artifacts.len(),
                    summary.duration().num_milliseconds()
                );
                self.emit_event(ExecutionEvent::PipelineSucceeded {
                    kind,
                    manifest_path: summary.manifest_path.clone(),
                    artifacts: summary.artifacts.clone(),
                });
            }
            Err(e) => {
                error!("{} pipeline failed: {}", kind, e);
                self.emit_event(ExecutionEvent::PipelineFailed {
                    kind,
                    error: e.to_string(),
                });
            }
        }
        result.into()
    }
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
