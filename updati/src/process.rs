//! Cancellable subprocess execution with captured diagnostics.

use std::process::{Output, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started.
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("{program} failed: {diagnostics}")]
    Failed {
        program: String,
        /// Captured diagnostic output (stderr, or stdout if stderr was empty).
        diagnostics: String,
    },

    /// The run was cancelled and the child was killed.
    #[error("{program} was cancelled")]
    Cancelled { program: String },
}

impl ProcessError {
    /// Returns the captured diagnostic text, if the command ran to completion.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Failed { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}

/// Runs `command` to completion, capturing stdout and stderr.
///
/// The child is killed if `cancel` fires before it exits. A nonzero exit
/// status is returned as [`ProcessError::Failed`] carrying the captured
/// diagnostics; `label` names the command in errors and logs.
///
/// # Errors
///
/// Returns [`ProcessError`] if the command cannot be spawned, exits
/// unsuccessfully, or is cancelled.
pub async fn run(
    mut command: Command,
    label: &str,
    cancel: &CancellationToken,
) -> Result<Output, ProcessError> {
    if cancel.is_cancelled() {
        return Err(ProcessError::Cancelled {
            program: label.to_string(),
        });
    }

    debug!(command = %label, "Running command");
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Dropping the output future on cancellation kills the child.
    let output = tokio::select! {
        output = command.output() => output.map_err(|source| ProcessError::Spawn {
            program: label.to_string(),
            source,
        })?,
        _ = cancel.cancelled() => {
            return Err(ProcessError::Cancelled {
                program: label.to_string(),
            });
        }
    };

    if !output.status.success() {
        return Err(ProcessError::Failed {
            program: label.to_string(),
            diagnostics: diagnostics(&output),
        });
    }

    Ok(output)
}

/// Extracts the most useful diagnostic text from a finished command.
fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.trim_end().to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return stdout.trim_end().to_string();
    }
    format!("exited with {}", output.status)
}
