//! CLI output formatting

use crate::{
    core::{BuildResult, ExecutionStatus, Manifest, PipelineKind, RunReport},
    execution::ExecutionEvent,
};
use console::Emoji;
use std::path::Path;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Machine-readable outcome line, e.g. `<scripts:success>`
pub fn marker(kind: PipelineKind, success: bool) -> String {
    let outcome = if success { "success" } else { "fail" };
    format!("<{}:{}>", kind, outcome)
}

/// Lines printed on stdout for a pipeline outcome event, if any
pub fn status_lines(event: &ExecutionEvent) -> Vec<String> {
    match event {
        ExecutionEvent::PipelineSucceeded { kind, .. } => vec![marker(*kind, true)],
        ExecutionEvent::PipelineFailed { kind, error } => {
            vec![marker(*kind, false), format!("Error: {}", error)]
        }
        _ => Vec::new(),
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Completed => style("SUCCESS").green().to_string(),
        ExecutionStatus::Failed => style("FAIL").red().to_string(),
    }
}

/// Format an execution event for verbose display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::BuildStarted { run_id, params } => format!(
            "{} Building {} into {} ({})",
            ROCKET,
            style(params.entry_root.display()).bold(),
            style(params.output_root.display()).bold(),
            style(&run_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::PipelineStarted { kind } => {
            format!("{} {} pipeline", INFO, style(kind).cyan())
        }
        ExecutionEvent::StageStarted { kind, stage } => {
            format!("  {} {}", style(kind).dim(), stage)
        }
        ExecutionEvent::StageCompleted { kind, stage } => {
            format!("  {} {} {}", style(kind).dim(), stage, style("done").green())
        }
        ExecutionEvent::PipelineSucceeded {
            kind, artifacts, ..
        } => format!(
            "{} {} ({} artifact(s))",
            CHECK,
            style(kind).green(),
            artifacts.len()
        ),
        ExecutionEvent::PipelineFailed { kind, error } => {
            format!("{} {}: {}", CROSS, style(kind).red(), style(error).dim())
        }
        ExecutionEvent::BuildFinished {
            scripts, styles, ..
        } => format!(
            "{} Build finished: scripts {}, styles {}",
            INFO,
            format_status(*scripts),
            format_status(*styles)
        ),
    }
}

/// Human summary for one pipeline, e.g. `Scripts build: SUCCESS`
/// followed by the public paths recorded in its manifest
pub fn format_summary(kind: PipelineKind, result: &BuildResult, output_root: &Path) -> String {
    let title = match kind {
        PipelineKind::Scripts => "Scripts build",
        PipelineKind::Styles => "Styles build",
    };
    let mut lines = vec![format!("{}: {}", style(title).bold(), format_status(result.status()))];

    if let Some(summary) = result.summary() {
        let prefix = output_root.to_string_lossy();
        match Manifest::read(&summary.manifest_path) {
            Ok(manifest) => {
                for path in manifest.asset_paths(Some(&*prefix)) {
                    lines.push(format!("  {}", style(path).cyan()));
                }
            }
            Err(e) => lines.push(format!("  {}", style(e).dim())),
        }
    }

    lines.join("\n")
}

/// Summaries for both pipelines
pub fn format_report(report: &RunReport, output_root: &Path) -> String {
    [PipelineKind::Scripts, PipelineKind::Styles]
        .into_iter()
        .map(|kind| format_summary(kind, report.result(kind), output_root))
        .collect::<Vec<_>>()
        .join("\n")
}
