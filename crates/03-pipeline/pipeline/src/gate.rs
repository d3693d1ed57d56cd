//! Formatting and lint checks that must pass before a build.

use log::info;

use command_exec::{CommandLine, CommandRunner};

use crate::{HarnessError, HarnessResult, Stage};

/// Formatter followed by linter.
///
/// Either half may be absent; a gate with neither is simply a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityGate {
    format: Option<CommandLine>,
    lint: Option<CommandLine>,
}

impl QualityGate {
    pub fn new(format: Option<CommandLine>, lint: Option<CommandLine>) -> Self {
        Self { format, lint }
    }

    pub fn is_empty(&self) -> bool {
        self.format.is_none() && self.lint.is_none()
    }

    /// Commands in execution order, tagged with their stage.
    pub fn steps(&self) -> impl Iterator<Item = (Stage, &CommandLine)> {
        let format = self.format.as_ref().map(|cmd| (Stage::Format, cmd));
        let lint = self.lint.as_ref().map(|cmd| (Stage::Lint, cmd));
        format.into_iter().chain(lint)
    }

    /// Formats the tree in place, then lints it. Stops at the first failure.
    pub fn run<R: CommandRunner + ?Sized>(&self, runner: &mut R) -> HarnessResult<()> {
        for (stage, cmd) in self.steps() {
            info!("{stage}");
            runner
                .run(cmd)
                .map_err(|source| HarnessError::tooling(stage, source))?;
        }
        Ok(())
    }
}
