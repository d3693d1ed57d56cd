//! Build & run orchestration with fail-fast propagation.

use std::path::Path;

use log::{debug, info};

use command_exec::{CommandLine, CommandRunner};
use fixtures::{Acquisition, Catalog, FixtureBundle, FixtureManifest, Sweep};

use crate::{HarnessError, HarnessResult, QualityGate, Stage};

/// How the emulator is launched for one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryInvocation {
    base: CommandLine,
    mode: Option<String>,
}

impl BinaryInvocation {
    pub fn new(base: CommandLine, mode: Option<String>) -> Self {
        Self { base, mode }
    }

    /// `<base> [mode] <fixture>`. An explicit `mode` wins over the configured one.
    pub fn command_for(&self, fixture: &Path, mode: Option<&str>) -> CommandLine {
        let mut cmd = self.base.clone();
        if let Some(flag) = mode.or(self.mode.as_deref()) {
            cmd = cmd.arg(flag);
        }
        cmd.arg(fixture)
    }
}

/// Where a pipeline run currently is.
///
/// `Failed` is terminal: a pipeline that reached it refuses further runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Gating,
    Building,
    Acquiring,
    Running { index: usize, total: usize },
    Done,
    Failed(i32),
}

/// Outcome of a completed sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub sweep: Sweep,
    pub fixtures_run: usize,
    /// `None` when the sweep had no bundle or nothing to run.
    pub acquisition: Option<Acquisition>,
}

/// Sequential gate → build → acquire → run pipeline.
///
/// Every child is awaited before the next starts and the first failure is
/// returned immediately; nothing after it runs.
pub struct Pipeline<R> {
    runner: R,
    gate: Option<QualityGate>,
    build: CommandLine,
    binary: BinaryInvocation,
    state: PipelineState,
    transitions: Vec<PipelineState>,
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn new(
        runner: R,
        gate: Option<QualityGate>,
        build: CommandLine,
        binary: BinaryInvocation,
    ) -> Self {
        Self {
            runner,
            gate,
            build,
            binary,
            state: PipelineState::Idle,
            transitions: vec![PipelineState::Idle],
        }
    }

    /// Drops the quality gate so runs go straight to the build.
    pub fn skip_gate(mut self) -> Self {
        self.gate = None;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// States visited by the latest run, starting at `Idle`.
    pub fn transitions(&self) -> &[PipelineState] {
        &self.transitions
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Quality gate, then build.
    pub fn make(&mut self) -> HarnessResult<()> {
        self.begin()?;
        let result = self.gate_and_build();
        self.finish(result)
    }

    /// Only the fixture acquisition step.
    pub fn acquire(&mut self, bundle: &FixtureBundle) -> HarnessResult<Acquisition> {
        self.begin()?;
        let result = self.acquire_bundle(bundle);
        self.finish(result)
    }

    /// Gate, build, fetch the bundle if missing, then every conformance ROM.
    pub fn run_conformance(&mut self, catalog: &Catalog) -> HarnessResult<SweepReport> {
        self.run_sweep(catalog.manifest(Sweep::Conformance), Some(catalog.bundle()))
    }

    /// Gate, build, then every compatibility cartridge. Nothing is fetched.
    pub fn run_compatibility(&mut self, catalog: &Catalog) -> HarnessResult<SweepReport> {
        self.run_sweep(catalog.manifest(Sweep::Compatibility), None)
    }

    /// Full sweep over `manifest`, acquiring `bundle` first when given.
    ///
    /// The bundle is not touched when the manifest is empty.
    pub fn run_sweep(
        &mut self,
        manifest: &FixtureManifest,
        bundle: Option<&FixtureBundle>,
    ) -> HarnessResult<SweepReport> {
        self.begin()?;
        let result = self.sweep(manifest, bundle);
        self.finish(result)
    }

    /// Runs the emulator over `manifest` without gating or building.
    pub fn run_fixtures(&mut self, manifest: &FixtureManifest) -> HarnessResult<usize> {
        self.begin()?;
        let result = self.run_each(manifest);
        self.finish(result)
    }

    /// Builds once, acquires `bundle` when given, then runs exactly one
    /// fixture with an extra mode flag.
    pub fn run_single(
        &mut self,
        fixture: &Path,
        mode: Option<&str>,
        bundle: Option<&FixtureBundle>,
    ) -> HarnessResult<Option<Acquisition>> {
        self.begin()?;
        let result = self.build_and_run_one(fixture, mode, bundle);
        self.finish(result)
    }

    fn begin(&mut self) -> HarnessResult<()> {
        if let PipelineState::Failed(code) = self.state {
            return Err(HarnessError::Aborted(code));
        }
        self.state = PipelineState::Idle;
        self.transitions.clear();
        self.transitions.push(PipelineState::Idle);
        Ok(())
    }

    fn finish<T>(&mut self, result: HarnessResult<T>) -> HarnessResult<T> {
        match &result {
            Ok(_) => self.enter(PipelineState::Done),
            Err(err) => self.enter(PipelineState::Failed(err.exit_code())),
        }
        result
    }

    fn enter(&mut self, next: PipelineState) {
        debug!("pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
        self.transitions.push(next);
    }

    fn gate_and_build(&mut self) -> HarnessResult<()> {
        if self.gate.is_some() {
            self.enter(PipelineState::Gating);
            if let Some(gate) = &self.gate {
                gate.run(&mut self.runner)?;
            }
        }
        self.build()
    }

    fn build(&mut self) -> HarnessResult<()> {
        self.enter(PipelineState::Building);
        info!("{}", Stage::Build);
        self.runner
            .run(&self.build)
            .map_err(|source| HarnessError::tooling(Stage::Build, source))
    }

    fn acquire_bundle(&mut self, bundle: &FixtureBundle) -> HarnessResult<Acquisition> {
        self.enter(PipelineState::Acquiring);
        bundle
            .acquire(&mut self.runner)
            .map_err(|source| HarnessError::AcquisitionFailure { source })
    }

    fn sweep(
        &mut self,
        manifest: &FixtureManifest,
        bundle: Option<&FixtureBundle>,
    ) -> HarnessResult<SweepReport> {
        self.gate_and_build()?;
        let acquisition = match bundle {
            Some(bundle) if !manifest.is_empty() => Some(self.acquire_bundle(bundle)?),
            _ => None,
        };
        let fixtures_run = self.run_each(manifest)?;
        info!(
            "{} sweep passed: {fixtures_run} fixture(s)",
            manifest.sweep().name()
        );
        Ok(SweepReport {
            sweep: manifest.sweep(),
            fixtures_run,
            acquisition,
        })
    }

    fn build_and_run_one(
        &mut self,
        fixture: &Path,
        mode: Option<&str>,
        bundle: Option<&FixtureBundle>,
    ) -> HarnessResult<Option<Acquisition>> {
        self.build()?;
        let acquisition = bundle
            .map(|bundle| self.acquire_bundle(bundle))
            .transpose()?;
        self.enter(PipelineState::Running { index: 0, total: 1 });
        self.run_fixture(0, fixture, mode)?;
        Ok(acquisition)
    }

    fn run_each(&mut self, manifest: &FixtureManifest) -> HarnessResult<usize> {
        let total = manifest.len();
        if total == 0 {
            info!("{} sweep is empty", manifest.sweep().name());
        }
        for (index, fixture) in manifest.iter().enumerate() {
            self.enter(PipelineState::Running { index, total });
            info!(
                "[{}/{total}] {} {}",
                index + 1,
                fixture.category,
                fixture.path.display()
            );
            self.run_fixture(index, &fixture.path, None)?;
        }
        Ok(total)
    }

    fn run_fixture(
        &mut self,
        index: usize,
        fixture: &Path,
        mode: Option<&str>,
    ) -> HarnessResult<()> {
        let cmd = self.binary.command_for(fixture, mode);
        self.runner.run(&cmd).map_err(|source| {
            HarnessError::tooling(
                Stage::RunFixture {
                    index,
                    path: fixture.to_path_buf(),
                },
                source,
            )
        })
    }
}
