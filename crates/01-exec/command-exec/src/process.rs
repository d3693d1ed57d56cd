use std::process::ExitStatus;

use log::debug;

use crate::{CommandLine, CommandRunner, ExecError, ExecResult};

/// Runs commands as real child processes.
///
/// The child inherits stdin/stdout/stderr, so tool output reaches the
/// operator unmodified. Each command is echoed as `$ <command>` before it is
/// spawned.
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner {
    quiet: bool,
}

impl ProcessRunner {
    /// Creates a runner that spawns in the harness's working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppresses the `$ <command>` echo.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, cmd: &CommandLine) -> ExecResult<()> {
        if !self.quiet {
            println!("$ {cmd}");
        }

        debug!("spawning {:?}", cmd.argv_lossy());
        let status = cmd.to_command().status().map_err(|source| ExecError::Spawn {
            command: cmd.to_string(),
            source,
        })?;
        debug!("{cmd} finished with {status}");
        check_status(cmd, status)
    }
}

fn check_status(cmd: &CommandLine, status: ExitStatus) -> ExecResult<()> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(ExecError::Failed {
            command: cmd.to_string(),
            code,
        }),
        None => Err(ExecError::Terminated {
            command: cmd.to_string(),
            signal: termination_signal(status),
        }),
    }
}

#[cfg(unix)]
fn termination_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: ExitStatus) -> Option<i32> {
    None
}
