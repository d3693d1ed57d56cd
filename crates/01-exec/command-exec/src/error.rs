use std::io;

use thiserror::Error;

/// Result alias for command execution.
pub type ExecResult<T> = Result<T, ExecError>;

/// Status reported when a command could not be started at all.
pub const SPAWN_FAILURE_CODE: i32 = 127;

/// Reasons a command did not complete successfully.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be started (missing executable, permissions).
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },

    /// The program ran and exited with a non-zero status.
    #[error("`{command}` exited with status {code}")]
    Failed {
        /// Rendered command line.
        command: String,
        /// Exit status reported by the child.
        code: i32,
    },

    /// The program was killed before it could report a status.
    #[error("`{command}` was terminated before reporting a status")]
    Terminated {
        /// Rendered command line.
        command: String,
        /// Terminating signal, when the platform reports one.
        signal: Option<i32>,
    },
}

impl ExecError {
    /// Exit status the harness should terminate with for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecError::Spawn { .. } => SPAWN_FAILURE_CODE,
            ExecError::Failed { code, .. } => *code,
            ExecError::Terminated {
                signal: Some(signal),
                ..
            } => 128 + signal,
            ExecError::Terminated { signal: None, .. } => 1,
        }
    }
}
