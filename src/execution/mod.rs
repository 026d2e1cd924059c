//! Build execution

pub mod executor;
pub mod runner;
pub mod scheduler;

pub use executor::StageExecutor;
pub use runner::{EventHandler, ExecutionEvent, PipelineRunner};
pub use scheduler::SchedulingStrategy;
