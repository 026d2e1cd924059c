//! Scenario-based tests for assetter

mod cleanup;
mod determinism;
mod end_to_end;
mod isolation;
