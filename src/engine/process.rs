//! Subprocess invocation shared by the engine clients

use crate::engine::EngineError;
use std::ffi::OsString;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// An external tool invoked as a subprocess
#[derive(Debug, Clone)]
pub struct EngineCommand {
    /// Executable followed by fixed leading arguments, e.g. `npx tailwindcss`
    command: Vec<String>,

    /// Timeout for command execution in seconds
    timeout_secs: u64,
}

impl EngineCommand {
    /// Create a command from a whitespace-separated command line
    pub fn new(command_line: &str, timeout_secs: u64) -> Self {
        Self {
            command: command_line.split_whitespace().map(str::to_string).collect(),
            timeout_secs,
        }
    }

    /// Executable name, used in diagnostics
    pub fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("")
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Run with `args` appended and return stdout.
    ///
    /// # Errors
    /// Returns `EngineError` if:
    /// - the executable cannot be spawned
    /// - it exits with a non-zero status
    /// - it does not finish within the timeout
    pub async fn run(&self, args: &[OsString]) -> Result<String, EngineError> {
        let engine = self.program().to_string();
        let (program, leading) = match self.command.split_first() {
            Some(split) => split,
            None => {
                return Err(EngineError::Spawn {
                    engine,
                    source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
                })
            }
        };

        debug!("Spawning {} with {} arguments", engine, leading.len() + args.len());

        let result = timeout(
            Duration::from_secs(self.timeout_secs),
            Command::new(program)
                .args(leading)
                .args(args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| EngineError::Timeout {
            engine: engine.clone(),
            secs: self.timeout_secs,
        })?;

        let output = result.map_err(|source| EngineError::Spawn {
            engine: engine.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", engine, code, stderr);
            return Err(EngineError::Failed {
                engine,
                code,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
