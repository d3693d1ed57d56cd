//! Format, lint, build and sweep the emulator over its test cartridges.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use command_exec::ProcessRunner;
use fixtures::{Catalog, FixtureBundle, Sweep};
use pipeline::{HarnessConfig, HarnessError, SweepReport};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Config picked up from the working directory when `--config` is absent.
const LOCAL_CONFIG: &str = "harness.toml";

/// Text rendering helpers used by the CLI commands.
mod render {
    use fixtures::{Catalog, FixtureManifest, Sweep};
    use std::fmt::Write;

    const LABEL_WIDTH: usize = 30;

    fn manifest(out: &mut String, manifest: &FixtureManifest) {
        if manifest.is_empty() {
            out.push_str("  (empty)\n");
        }
        for fixture in manifest {
            writeln!(
                out,
                "  {:<width$}  {}",
                fixture.category.label(),
                fixture.path.display(),
                width = LABEL_WIDTH
            )
            .expect("write fixture");
        }
    }

    /// Lists one or both sweeps with category tags and resolved paths.
    pub fn catalog(catalog: &Catalog, only: Option<Sweep>) -> String {
        let mut out = String::new();
        if only.map_or(true, |sweep| sweep == Sweep::Conformance) {
            let bundle = catalog.bundle();
            writeln!(
                out,
                "conformance (bundle {} -> {})",
                bundle.url,
                bundle.dir.display()
            )
            .expect("write header");
            manifest(&mut out, catalog.manifest(Sweep::Conformance));
        }
        if only.map_or(true, |sweep| sweep == Sweep::Compatibility) {
            out.push_str("compatibility\n");
            manifest(&mut out, catalog.manifest(Sweep::Compatibility));
        }
        out
    }
}

/// Build and conformance harness for the cartridge emulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "Gate, build and sweep the emulator over test ROMs", long_about = None)]
struct Cli {
    /// Harness configuration (defaults to ./harness.toml, then the built-in profile).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fixture catalog replacing the configuration's `[fixtures]` section.
    #[arg(long, global = true, value_name = "PATH")]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Format, lint and build (the default).
    Make,
    /// Build, fetch the conformance bundle if missing, run every conformance ROM.
    Test {
        /// Skip formatting and linting.
        #[arg(long)]
        skip_gate: bool,
    },
    /// Build and run every compatibility cartridge.
    TestRoms {
        /// Skip formatting and linting.
        #[arg(long)]
        skip_gate: bool,
    },
    /// Build, then run exactly one fixture.
    Run {
        /// Category label from the catalog, or a path to a cartridge.
        #[arg(value_name = "FIXTURE")]
        fixture: String,
        /// Flag passed to the emulator before the fixture (e.g. --autoplay).
        #[arg(long, value_name = "FLAG", allow_hyphen_values = true)]
        mode: Option<String>,
    },
    /// Clone the conformance bundle unless it is already present.
    Acquire,
    /// Print the fixture catalog without running anything.
    List {
        /// Restrict the listing to one sweep.
        #[arg(long, value_enum)]
        sweep: Option<SweepArg>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SweepArg {
    /// Instruction-set and timing ROMs from the fetched bundle.
    Conformance,
    /// Real-world cartridges at fixed local paths.
    Compatibility,
}

impl From<SweepArg> for Sweep {
    fn from(arg: SweepArg) -> Self {
        match arg {
            SweepArg::Conformance => Sweep::Conformance,
            SweepArg::Compatibility => Sweep::Compatibility,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore error if already set (e.g., during tests).
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// First failing child's status, clamped into the range a process can report.
///
/// `ExitCode` carries a single byte, so statuses outside `1..=255` (possible
/// on Windows, where exit codes are 32-bit) are reported as 1 and the real
/// status only survives in the logged error.
fn exit_status(err: &anyhow::Error) -> u8 {
    let code = err
        .downcast_ref::<HarnessError>()
        .map_or(1, HarnessError::exit_code);
    u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let catalog = || load_catalog(cli.fixtures.as_deref(), &config);
    let pipeline = || config.pipeline(ProcessRunner::new());

    match cli.command.unwrap_or(Command::Make) {
        Command::Make => pipeline()?.make()?,
        Command::Test { skip_gate } => {
            let mut pipeline = pipeline()?;
            if skip_gate {
                pipeline = pipeline.skip_gate();
            }
            report(pipeline.run_conformance(&catalog()?)?);
        }
        Command::TestRoms { skip_gate } => {
            let mut pipeline = pipeline()?;
            if skip_gate {
                pipeline = pipeline.skip_gate();
            }
            report(pipeline.run_compatibility(&catalog()?)?);
        }
        Command::Run { fixture, mode } => {
            let catalog = catalog()?;
            let (path, bundle) = resolve_fixture(&catalog, &fixture);
            let acquisition = pipeline()?.run_single(&path, mode.as_deref(), bundle)?;
            if let Some(outcome) = acquisition {
                info!(?outcome, "fixture bundle ready");
            }
        }
        Command::Acquire => {
            let catalog = catalog()?;
            let outcome = pipeline()?.acquire(catalog.bundle())?;
            info!(?outcome, dir = %catalog.bundle().dir.display(), "fixture bundle ready");
        }
        Command::List { sweep } => {
            print!("{}", render::catalog(&catalog()?, sweep.map(Sweep::from)));
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<HarnessConfig> {
    let path = match explicit {
        Some(path) => path,
        None if Path::new(LOCAL_CONFIG).exists() => Path::new(LOCAL_CONFIG),
        None => return HarnessConfig::builtin().context("built-in harness profile"),
    };
    HarnessConfig::load(path).with_context(|| format!("failed to load config {path:?}"))
}

fn load_catalog(explicit: Option<&Path>, config: &HarnessConfig) -> Result<Catalog> {
    match explicit {
        Some(path) => Catalog::load(path)
            .map_err(HarnessError::from)
            .with_context(|| format!("failed to load fixture catalog {path:?}")),
        None => Ok(config.catalog()),
    }
}

/// Catalog entry for a category label or known path, else the argument as a
/// path. Conformance entries come with the bundle they live in.
fn resolve_fixture<'a>(
    catalog: &'a Catalog,
    query: &str,
) -> (PathBuf, Option<&'a FixtureBundle>) {
    match catalog.resolve(query) {
        Some(fixture) => {
            let bundle = fixture.category.is_conformance().then_some(catalog.bundle());
            (fixture.path.clone(), bundle)
        }
        None => (PathBuf::from(query), None),
    }
}

fn report(report: SweepReport) {
    info!(
        sweep = report.sweep.name(),
        fixtures = report.fixtures_run,
        acquisition = ?report.acquisition,
        "sweep passed"
    );
}
