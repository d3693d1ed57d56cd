//! Quality gate, build and fixture-sweep orchestration for the emulator.
//!
//! A [`Pipeline`] strings external commands together strictly in sequence:
//! formatter, linter, build, fixture acquisition, then one emulator run per
//! fixture. The first command that fails stops the pipeline and its error
//! carries the child's exit status back to the caller, which is expected to
//! exit with [`HarnessError::exit_code`].

mod config;
mod error;
mod gate;
mod lint;
mod orchestrator;

pub use config::{BinaryConfig, HarnessConfig, Toolchain};
pub use error::{HarnessError, HarnessResult, Stage, CONFIG_ERROR_CODE};
pub use gate::QualityGate;
pub use lint::{LintConfig, LintPolicy, RuleSet};
pub use orchestrator::{BinaryInvocation, Pipeline, PipelineState, SweepReport};
