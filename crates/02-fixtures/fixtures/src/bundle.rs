use std::num::NonZeroU32;
use std::path::PathBuf;

use command_exec::{CommandLine, CommandRunner, ExecResult};
use log::{debug, info};
use serde::Deserialize;

/// Upstream repository of the blargg conformance ROMs.
pub const DEFAULT_BUNDLE_URL: &str = "https://github.com/retrio/gb-test-roms";
/// Local checkout location used when a catalog does not name one.
pub const DEFAULT_BUNDLE_DIR: &str = "./res/gb-test-roms";

fn default_depth() -> NonZeroU32 {
    NonZeroU32::MIN
}

/// A git-hosted collection of conformance ROMs and where it lives locally.
///
/// The local directory existing is taken as proof the bundle is complete;
/// nothing is ever re-fetched, updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureBundle {
    pub url: String,
    pub dir: PathBuf,
    /// Shallow-clone depth; zero is rejected when the catalog is parsed.
    #[serde(default = "default_depth")]
    pub depth: NonZeroU32,
}

impl Default for FixtureBundle {
    fn default() -> Self {
        Self {
            url: DEFAULT_BUNDLE_URL.to_owned(),
            dir: PathBuf::from(DEFAULT_BUNDLE_DIR),
            depth: default_depth(),
        }
    }
}

/// What [`FixtureBundle::acquire`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// The directory already existed; no command was issued.
    AlreadyPresent,
    /// A shallow clone was performed.
    Cloned,
}

impl FixtureBundle {
    pub fn new(url: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dir: dir.into(),
            depth: default_depth(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.dir.exists()
    }

    /// `git clone --depth=<depth> <url> <dir>`.
    pub fn clone_command(&self) -> CommandLine {
        CommandLine::new("git")
            .arg("clone")
            .arg(format!("--depth={}", self.depth))
            .arg(&self.url)
            .arg(&self.dir)
    }

    /// Clones the bundle unless its directory already exists.
    ///
    /// The existence check and the clone are not atomic; two harnesses
    /// racing on the same directory may both attempt the clone.
    pub fn acquire<R: CommandRunner + ?Sized>(&self, runner: &mut R) -> ExecResult<Acquisition> {
        if self.is_present() {
            debug!("fixture bundle present at {}", self.dir.display());
            return Ok(Acquisition::AlreadyPresent);
        }
        info!(
            "fetching fixture bundle {} into {}",
            self.url,
            self.dir.display()
        );
        runner.run(&self.clone_command())?;
        Ok(Acquisition::Cloned)
    }
}
