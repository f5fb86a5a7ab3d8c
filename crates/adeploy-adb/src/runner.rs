//! Out-of-process execution of adb commands
//!
//! [`CommandRunner`] is the seam every workflow goes through. The production
//! [`AdbRunner`] spawns the process on its own tokio task so the caller stays
//! responsive; there is no retry, timeout or cancellation at this layer.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::commands::AdbCommand;
use adeploy_core::prelude::*;

/// Result of one adb invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `true` iff the process exited with status zero
    pub succeeded: bool,

    /// stdout, then stderr on a new line when non-empty; trimmed
    pub output: String,
}

impl CommandOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            output: output.into(),
        }
    }

    /// Build an outcome from raw process streams
    pub fn from_streams(succeeded: bool, stdout: &str, stderr: &str) -> Self {
        Self {
            succeeded,
            output: combine_output(stdout, stderr),
        }
    }

    /// Case-insensitive substring match on the output
    pub fn output_contains(&self, phrase: &str) -> bool {
        self.output
            .to_lowercase()
            .contains(&phrase.to_lowercase())
    }
}

/// Concatenate stdout and stderr into one trimmed string.
///
/// stderr is appended only when it carries non-whitespace text.
pub fn combine_output(stdout: &str, stderr: &str) -> String {
    let mut combined = stdout.trim().to_string();
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(stderr);
    }
    combined
}

/// Runs a single adb command line to completion.
///
/// Implementations never fail: spawn errors and non-zero exits are reported
/// as `succeeded = false` with a descriptive output.
#[trait_variant::make(CommandRunner: Send)]
pub trait LocalCommandRunner {
    async fn run(&self, command: &AdbCommand) -> CommandOutcome;
}

/// Runner backed by the real `adb` binary
#[derive(Debug, Clone)]
pub struct AdbRunner {
    adb_path: PathBuf,
}

impl AdbRunner {
    pub fn new(adb_path: impl Into<PathBuf>) -> Self {
        Self {
            adb_path: adb_path.into(),
        }
    }

    pub fn adb_path(&self) -> &Path {
        &self.adb_path
    }
}

impl Default for AdbRunner {
    /// Resolve `adb` through `PATH` at spawn time
    fn default() -> Self {
        Self::new("adb")
    }
}

impl CommandRunner for AdbRunner {
    async fn run(&self, command: &AdbCommand) -> CommandOutcome {
        let program = self.adb_path.clone();
        let args = command.args();
        let line = command.to_string();

        debug!("Running: {}", line);

        // The child runs on its own task; awaiting the handle parks this
        // future without blocking the caller's thread.
        let worker = tokio::spawn(async move {
            Command::new(&program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await
        });

        let outcome = match worker.await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                let outcome = CommandOutcome::from_streams(output.status.success(), &stdout, &stderr);
                if !outcome.succeeded {
                    debug!(
                        "{} exited with code {:?}",
                        command.description(),
                        output.status.code()
                    );
                }
                outcome
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("adb binary not found at {}", self.adb_path.display());
                CommandOutcome::failure(format!(
                    "{} (looked for '{}')",
                    Error::AdbNotFound,
                    self.adb_path.display()
                ))
            }
            Ok(Err(e)) => {
                warn!("Failed to spawn {}: {}", line, e);
                CommandOutcome::failure(
                    Error::ProcessSpawn {
                        reason: e.to_string(),
                    }
                    .to_string(),
                )
            }
            Err(e) => {
                error!("adb worker task for '{}' did not complete: {}", line, e);
                CommandOutcome::failure(format!("adb worker task failed: {}", e))
            }
        };

        trace!("{} -> {:?}", line, outcome);
        outcome
    }
}
