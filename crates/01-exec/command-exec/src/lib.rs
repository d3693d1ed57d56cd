#![deny(missing_docs)]
//! Synchronous execution of external commands.
//!
//! Every stage of the harness (formatting, linting, building, cloning the
//! fixture bundle, running the emulator) is a child process that is spawned
//! and awaited to completion before anything else happens. This crate owns
//! that primitive: a structured [`CommandLine`] (no shell is ever involved),
//! the [`CommandRunner`] seam the pipeline is written against, and the real
//! [`ProcessRunner`] that inherits the harness's stdout/stderr.

mod error;
mod line;
mod process;

pub use error::{ExecError, ExecResult, SPAWN_FAILURE_CODE};
pub use line::CommandLine;
pub use process::ProcessRunner;

/// Executes commands to completion, one at a time.
///
/// Implementations must only return `Ok(())` when the command exited with
/// status 0. Any other outcome is reported as an [`ExecError`] carrying the
/// status the harness should eventually exit with.
pub trait CommandRunner {
    /// Runs `cmd` and waits for it to finish.
    fn run(&mut self, cmd: &CommandLine) -> ExecResult<()>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, cmd: &CommandLine) -> ExecResult<()> {
        (**self).run(cmd)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&mut self, cmd: &CommandLine) -> ExecResult<()> {
        (**self).run(cmd)
    }
}
