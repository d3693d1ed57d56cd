//! Scripted command runner that records invocations instead of spawning.

use command_exec::{CommandLine, CommandRunner, ExecError, ExecResult};

type Hook = Box<dyn FnMut(&CommandLine)>;

struct Rule {
    needle: String,
    code: i32,
}

/// In-memory [`CommandRunner`] for pipeline tests.
///
/// Every command is recorded, including ones that are scripted to fail.
/// Matching is by substring against each argv element, so a needle can name
/// a program (`"git"`) or a fixture file (`"B.gb"`).
#[derive(Default)]
pub struct ScriptedRunner {
    invocations: Vec<CommandLine>,
    failures: Vec<Rule>,
    hooks: Vec<(String, Hook)>,
}

impl ScriptedRunner {
    /// Creates a runner where every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes commands mentioning `needle` exit with `code`.
    pub fn fail_when(mut self, needle: impl Into<String>, code: i32) -> Self {
        self.failures.push(Rule {
            needle: needle.into(),
            code,
        });
        self
    }

    /// Runs `hook` after a successful command mentioning `needle`.
    pub fn after(
        mut self,
        needle: impl Into<String>,
        hook: impl FnMut(&CommandLine) + 'static,
    ) -> Self {
        self.hooks.push((needle.into(), Box::new(hook)));
        self
    }

    /// Commands seen so far, in order.
    pub fn invocations(&self) -> &[CommandLine] {
        &self.invocations
    }

    /// Rendered argv of every command seen so far.
    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.invocations.iter().map(CommandLine::argv_lossy).collect()
    }

    /// Number of recorded commands mentioning `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.invocations
            .iter()
            .filter(|cmd| mentions(cmd, needle))
            .count()
    }
}

fn mentions(cmd: &CommandLine, needle: &str) -> bool {
    cmd.argv_lossy().iter().any(|part| part.contains(needle))
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, cmd: &CommandLine) -> ExecResult<()> {
        self.invocations.push(cmd.clone());

        if let Some(rule) = self.failures.iter().find(|rule| mentions(cmd, &rule.needle)) {
            return Err(ExecError::Failed {
                command: cmd.to_string(),
                code: rule.code,
            });
        }

        for (needle, hook) in &mut self.hooks {
            if mentions(cmd, needle) {
                hook(cmd);
            }
        }
        Ok(())
    }
}
