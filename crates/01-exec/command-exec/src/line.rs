use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::Command;

/// A program plus its discrete arguments.
///
/// Arguments are handed to the OS as-is, so paths containing spaces,
/// parentheses or brackets need no quoting. Quoting only happens in the
/// [`Display`](fmt::Display) rendering used for the echoed audit line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandLine {
    /// Starts a command line for `program` with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builds a command line from an argv-style list (program first).
    ///
    /// Returns `None` for an empty list.
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut iter = argv.into_iter();
        let program = iter.next()?;
        Some(Self::new(program).args(iter))
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program to execute.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments, excluding the program.
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Full argv (program first), lossily converted to UTF-8.
    pub fn argv_lossy(&self) -> Vec<String> {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy().into_owned())
            .collect()
    }

    /// Materialises a [`Command`] with the harness's stdio inherited.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

fn needs_quotes(part: &str) -> bool {
    part.is_empty()
        || part.chars().any(|c| {
            c.is_whitespace()
                || matches!(
                    c,
                    '"' | '\'' | '\\' | '$' | '`' | '(' | ')' | '[' | ']' | '&' | ';' | '|' | '<'
                        | '>' | '*' | '?' | '!' | '#' | '{' | '}'
                )
        })
}

fn write_part(f: &mut fmt::Formatter<'_>, part: &OsStr) -> fmt::Result {
    let part = part.to_string_lossy();
    if !needs_quotes(&part) {
        return f.write_str(&part);
    }
    f.write_str("\"")?;
    for c in part.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_part(f, &self.program)?;
        for arg in &self.args {
            f.write_str(" ")?;
            write_part(f, arg)?;
        }
        Ok(())
    }
}
