//! `harness.toml` loading.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use command_exec::{CommandLine, CommandRunner};
use fixtures::{Catalog, CatalogFile};

use crate::{
    BinaryInvocation, HarnessError, HarnessResult, LintConfig, Pipeline, QualityGate,
};

const BUILTIN: &str = include_str!("../defaults/harness.toml");

fn default_build() -> Vec<String> {
    vec!["cargo".into(), "build".into()]
}

fn default_binary() -> Vec<String> {
    vec!["cargo".into(), "run".into(), "--".into()]
}

/// `[toolchain]`: formatter and build argv.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Toolchain {
    #[serde(default)]
    pub format: Option<Vec<String>>,
    #[serde(default = "default_build")]
    pub build: Vec<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            format: None,
            build: default_build(),
        }
    }
}

/// `[binary]`: how the emulator is launched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinaryConfig {
    #[serde(default = "default_binary")]
    pub command: Vec<String>,
    /// Flag placed before the fixture path on every sweep run.
    #[serde(default)]
    pub mode: Option<String>,
}

impl Default for BinaryConfig {
    fn default() -> Self {
        Self {
            command: default_binary(),
            mode: None,
        }
    }
}

/// Whole harness configuration, including the fixture catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    #[serde(default)]
    pub toolchain: Toolchain,
    #[serde(default)]
    pub lint: Option<LintConfig>,
    #[serde(default)]
    pub binary: BinaryConfig,
    #[serde(default)]
    pub fixtures: CatalogFile,
}

fn argv(field: &str, argv: &[String]) -> HarnessResult<CommandLine> {
    CommandLine::from_argv(argv).ok_or_else(|| HarnessError::Config(format!("{field} is empty")))
}

impl HarnessConfig {
    /// Profile compiled into the harness: allow-list clippy, conformance ROMs
    /// cloned into `./res/gb-test-roms`, emulator launched through `cargo run`.
    pub fn builtin() -> HarnessResult<Self> {
        Self::from_toml_str(BUILTIN, "<builtin>")
    }

    pub fn from_toml_str(src: &str, origin: &str) -> HarnessResult<Self> {
        let config: HarnessConfig =
            toml::from_str(src).map_err(|source| HarnessError::ConfigParse {
                origin: origin.to_owned(),
                source,
            })?;
        debug!(
            "harness config {origin}: gate={} lint={:?}",
            config.toolchain.format.is_some() || config.lint.is_some(),
            config.lint.as_ref().map(|lint| lint.policy)
        );
        Ok(config)
    }

    pub fn load(path: &Path) -> HarnessResult<Self> {
        let src = fs::read_to_string(path).map_err(|source| HarnessError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src, &path.display().to_string())
    }

    /// Formatter + linter, or `None` when neither is configured.
    pub fn quality_gate(&self) -> HarnessResult<Option<QualityGate>> {
        let format = self
            .toolchain
            .format
            .as_deref()
            .map(|cmd| argv("toolchain.format", cmd))
            .transpose()?;
        let lint = self.lint.as_ref().map(LintConfig::command).transpose()?;
        let gate = QualityGate::new(format, lint);
        Ok((!gate.is_empty()).then_some(gate))
    }

    pub fn build_command(&self) -> HarnessResult<CommandLine> {
        argv("toolchain.build", &self.toolchain.build)
    }

    pub fn binary(&self) -> HarnessResult<BinaryInvocation> {
        let base = argv("binary.command", &self.binary.command)?;
        Ok(BinaryInvocation::new(base, self.binary.mode.clone()))
    }

    pub fn catalog(&self) -> Catalog {
        self.fixtures.clone().into_catalog()
    }

    /// Wires a pipeline driving `runner` from this configuration.
    pub fn pipeline<R: CommandRunner>(&self, runner: R) -> HarnessResult<Pipeline<R>> {
        Ok(Pipeline::new(
            runner,
            self.quality_gate()?,
            self.build_command()?,
            self.binary()?,
        ))
    }
}
