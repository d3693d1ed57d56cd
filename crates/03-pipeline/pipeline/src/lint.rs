//! Lint rule overlays.

use log::debug;
use serde::Deserialize;

use command_exec::CommandLine;

use crate::{HarnessError, HarnessResult};

/// Whether the rule set silences diagnostics or escalates them.
///
/// One polarity is chosen per deployment in the harness config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintPolicy {
    /// Suppress each rule (`-A <rule>`).
    Allow,
    /// Turn each rule into a hard error (`-D <rule>`).
    Deny,
}

impl LintPolicy {
    /// Per-rule flag used when the config does not override it.
    pub fn default_flag(self) -> &'static str {
        match self {
            LintPolicy::Allow => "-A",
            LintPolicy::Deny => "-D",
        }
    }
}

/// Diagnostic identifiers passed through to the linter.
///
/// Duplicates are dropped on insert; iteration follows first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct RuleSet {
    rules: Vec<String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `rule`; returns `false` if it was already present.
    pub fn insert(&mut self, rule: impl Into<String>) -> bool {
        let rule = rule.into();
        if self.rules.contains(&rule) {
            return false;
        }
        self.rules.push(rule);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<Vec<String>> for RuleSet {
    fn from(rules: Vec<String>) -> Self {
        rules.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for RuleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = RuleSet::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

/// `[lint]` table: linter argv, polarity and rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintConfig {
    pub command: Vec<String>,
    pub policy: LintPolicy,
    #[serde(default)]
    pub rules: RuleSet,
    /// Overrides the policy's per-rule flag.
    #[serde(default)]
    pub flag: Option<String>,
    /// Joins flag and rule into a single argument (`--allow=<rule>`);
    /// without it they are two arguments.
    #[serde(default)]
    pub separator: Option<String>,
}

impl LintConfig {
    pub fn new(command: Vec<String>, policy: LintPolicy, rules: RuleSet) -> Self {
        Self {
            command,
            policy,
            rules,
            flag: None,
            separator: None,
        }
    }

    fn flag(&self) -> &str {
        self.flag
            .as_deref()
            .unwrap_or_else(|| self.policy.default_flag())
    }

    /// Rule flags in rule-set order, one overlay per rule.
    pub fn rule_args(&self) -> Vec<String> {
        let flag = self.flag();
        let mut args = Vec::with_capacity(self.rules.len() * 2);
        for rule in self.rules.iter() {
            match &self.separator {
                Some(sep) => args.push(format!("{flag}{sep}{rule}")),
                None => {
                    args.push(flag.to_owned());
                    args.push(rule.to_owned());
                }
            }
        }
        args
    }

    /// Full linter invocation.
    pub fn command(&self) -> HarnessResult<CommandLine> {
        let base = CommandLine::from_argv(&self.command)
            .ok_or_else(|| HarnessError::Config("lint.command is empty".into()))?;
        let args = self.rule_args();
        debug!(
            "lint overlay {:?} with {} rule(s)",
            self.policy,
            self.rules.len()
        );
        Ok(base.args(args))
    }
}
