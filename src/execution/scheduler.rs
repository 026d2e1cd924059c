//! Scheduling of the two pipelines relative to each other

use serde::{Deserialize, Serialize};

/// Strategy for scheduling the script and style pipelines.
///
/// Either way both pipelines run to completion; only their interleaving
/// differs. Within a pipeline stages are always sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulingStrategy {
    /// Scripts first, then styles
    #[default]
    Sequential,

    /// Both pipelines as concurrent futures on the current task
    Concurrent,
}
