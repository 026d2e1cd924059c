//! CLI argument types

use crate::core::BuildParameters;
use crate::execution::SchedulingStrategy;
use clap::Args;

/// The three roots of a build.
///
/// `--root-path` and `--output-path` are accepted as aliases so older
/// invocations keep working against the same runner.
#[derive(Debug, Args, Clone)]
pub struct PathArgs {
    /// Source root containing scripts/main.* and styles/main.css
    #[arg(long, visible_alias = "root-path", value_name = "DIR")]
    pub entry_path: String,

    /// Directory containing tailwind.config.*
    #[arg(long, value_name = "DIR")]
    pub config_path: String,

    /// Root for hashed artifacts and manifests
    #[arg(long, visible_alias = "output-path", value_name = "DIR")]
    pub public_path: String,
}

impl PathArgs {
    pub fn to_parameters(&self) -> Result<BuildParameters, crate::core::BuildError> {
        BuildParameters::new(&self.entry_path, &self.config_path, &self.public_path)
    }
}

/// Scheduling strategy argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SchedulingStrategyArg {
    Sequential,
    Concurrent,
}

impl From<SchedulingStrategyArg> for SchedulingStrategy {
    fn from(arg: SchedulingStrategyArg) -> Self {
        match arg {
            SchedulingStrategyArg::Sequential => SchedulingStrategy::Sequential,
            SchedulingStrategyArg::Concurrent => SchedulingStrategy::Concurrent,
        }
    }
}
