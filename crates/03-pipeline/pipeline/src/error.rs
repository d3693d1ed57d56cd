use std::fmt;
use std::path::PathBuf;

use command_exec::ExecError;
use fixtures::ManifestError;
use thiserror::Error;

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Status used for configuration and catalog problems, matching clap's
/// usage-error code.
pub const CONFIG_ERROR_CODE: i32 = 2;

/// A step of the pipeline that can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Format,
    Lint,
    Build,
    AcquireFixtures,
    RunFixture { index: usize, path: PathBuf },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Format => f.write_str("format"),
            Stage::Lint => f.write_str("lint"),
            Stage::Build => f.write_str("build"),
            Stage::AcquireFixtures => f.write_str("acquire-fixtures"),
            Stage::RunFixture { index, path } => {
                write!(f, "run-fixture #{index} ({})", path.display())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Formatter, linter, build or emulator exited unsuccessfully. A fixture
    /// missing from disk also lands here, through the emulator's own exit.
    #[error("{stage} failed: {source}")]
    ToolingFailure {
        stage: Stage,
        #[source]
        source: ExecError,
    },

    #[error("fixture acquisition failed: {source}")]
    AcquisitionFailure {
        #[source]
        source: ExecError,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("reading harness config {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing harness config {origin}: {source}")]
    ConfigParse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid harness configuration: {0}")]
    Config(String),

    /// An earlier run of the same pipeline failed; it has to be rebuilt.
    #[error("pipeline already failed with status {0}")]
    Aborted(i32),
}

impl HarnessError {
    pub fn tooling(stage: Stage, source: ExecError) -> Self {
        HarnessError::ToolingFailure { stage, source }
    }

    /// Status the harness process should exit with.
    ///
    /// Child failures propagate the child's own status unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            HarnessError::ToolingFailure { source, .. }
            | HarnessError::AcquisitionFailure { source } => source.exit_code(),
            HarnessError::Aborted(code) => *code,
            HarnessError::Manifest(_)
            | HarnessError::ConfigIo { .. }
            | HarnessError::ConfigParse { .. }
            | HarnessError::Config(_) => CONFIG_ERROR_CODE,
        }
    }

    /// Stage that failed, when the failure came from a child process.
    pub fn stage(&self) -> Option<&Stage> {
        match self {
            HarnessError::ToolingFailure { stage, .. } => Some(stage),
            HarnessError::AcquisitionFailure { .. } => Some(&Stage::AcquireFixtures),
            _ => None,
        }
    }
}
