use std::fs;

use fixtures::{Acquisition, Catalog, FixtureBundle, Sweep};
use mock::ScriptedRunner;
use pipeline::{HarnessError, PipelineState};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::support::{clones, emulator_runs, manifest, pipeline, EMULATOR};

fn catalog(bundle_dir: &std::path::Path) -> Catalog {
    let src = format!(
        r#"
[bundle]
url = "https://example.invalid/gb-test-roms"
dir = "{}"

[[conformance]]
category = "conformance-instruction-timing"
path = "instr_timing/instr_timing.gb"

[[conformance]]
category = "conformance-instruction-set"
path = "cpu_instrs/cpu_instrs.gb"

[[compatibility]]
category = "rom-only"
path = "/tmp/gb/3D Wireframe Demo (PD) [C].gbc"
"#,
        bundle_dir.display()
    );
    Catalog::from_toml_str(&src, "scenario").expect("parse scenario catalog")
}

#[test]
fn missing_bundle_is_cloned_once_before_any_run() {
    let tmp = TempDir::new().expect("tempdir");
    let catalog = catalog(&tmp.path().join("gb-test-roms"));
    let mut pipeline = pipeline(ScriptedRunner::new());

    let report = pipeline.run_conformance(&catalog).expect("sweep passes");
    assert_eq!(report.acquisition, Some(Acquisition::Cloned));

    let argvs = pipeline.runner().argvs();
    let git_runs: Vec<_> = argvs
        .iter()
        .enumerate()
        .filter(|(_, argv)| argv[0] == "git")
        .collect();
    assert_eq!(git_runs.len(), 1);
    let (clone_at, clone) = git_runs[0];
    assert!(clone.contains(&"--depth=1".to_owned()), "{clone:?}");

    let first_run = argvs
        .iter()
        .position(|argv| argv[0] == EMULATOR)
        .expect("emulator ran");
    assert!(clone_at < first_run);
    assert!(pipeline
        .transitions()
        .contains(&PipelineState::Acquiring));
}

#[test]
fn present_bundle_goes_straight_to_the_runs() {
    let tmp = TempDir::new().expect("tempdir");
    let catalog = catalog(tmp.path());
    let mut pipeline = pipeline(ScriptedRunner::new());

    let report = pipeline.run_conformance(&catalog).expect("sweep passes");
    assert_eq!(report.acquisition, Some(Acquisition::AlreadyPresent));
    assert_eq!(clones(pipeline.runner()), 0);

    let root = tmp.path().display().to_string();
    assert_eq!(
        emulator_runs(pipeline.runner()),
        vec![
            format!("{root}/instr_timing/instr_timing.gb"),
            format!("{root}/cpu_instrs/cpu_instrs.gb"),
        ]
    );
}

#[test]
fn rerun_after_clone_does_not_fetch_again() {
    let tmp = TempDir::new().expect("tempdir");
    let dir = tmp.path().join("gb-test-roms");
    let bundle = FixtureBundle::new("https://example.invalid/gb-test-roms", &dir);
    let created = dir.clone();
    let runner = ScriptedRunner::new().after("clone", move |_| {
        fs::create_dir_all(&created).expect("simulate clone");
    });
    let mut pipeline = pipeline(runner);

    assert_eq!(pipeline.acquire(&bundle).unwrap(), Acquisition::Cloned);
    assert_eq!(pipeline.acquire(&bundle).unwrap(), Acquisition::AlreadyPresent);
    assert_eq!(clones(pipeline.runner()), 1);
}

#[test]
fn clone_failure_aborts_before_any_run() {
    let tmp = TempDir::new().expect("tempdir");
    let catalog = catalog(&tmp.path().join("gb-test-roms"));
    let mut pipeline = pipeline(ScriptedRunner::new().fail_when("git", 128));

    let err = pipeline.run_conformance(&catalog).unwrap_err();
    assert!(matches!(err, HarnessError::AcquisitionFailure { .. }), "{err:?}");
    assert_eq!(err.exit_code(), 128);
    assert!(emulator_runs(pipeline.runner()).is_empty());
}

#[test]
fn compatibility_sweep_never_fetches() {
    let tmp = TempDir::new().expect("tempdir");
    let catalog = catalog(&tmp.path().join("gb-test-roms"));
    let mut pipeline = pipeline(ScriptedRunner::new());

    let report = pipeline.run_compatibility(&catalog).expect("sweep passes");
    assert_eq!(report.acquisition, None);
    assert_eq!(clones(pipeline.runner()), 0);
    assert_eq!(
        emulator_runs(pipeline.runner()),
        vec!["/tmp/gb/3D Wireframe Demo (PD) [C].gbc"]
    );
}

#[test]
fn empty_conformance_sweep_skips_acquisition() {
    let tmp = TempDir::new().expect("tempdir");
    let bundle = FixtureBundle::new("https://example.invalid/roms", tmp.path().join("missing"));
    let mut pipeline = pipeline(ScriptedRunner::new());

    let report = pipeline
        .run_sweep(&manifest(Sweep::Conformance, &[]), Some(&bundle))
        .expect("vacuous pass");
    assert_eq!(report.fixtures_run, 0);
    assert_eq!(report.acquisition, None);
    assert_eq!(clones(pipeline.runner()), 0);
}

#[test]
fn single_conformance_run_fetches_the_bundle_first() {
    let tmp = TempDir::new().expect("tempdir");
    let catalog = catalog(&tmp.path().join("gb-test-roms"));
    let fixture = catalog
        .resolve("conformance-instruction-set")
        .expect("catalog entry");
    let mut pipeline = pipeline(ScriptedRunner::new());

    let acquisition = pipeline
        .run_single(&fixture.path, None, Some(catalog.bundle()))
        .expect("single run passes");
    assert_eq!(acquisition, Some(Acquisition::Cloned));

    let programs: Vec<_> = pipeline
        .runner()
        .argvs()
        .into_iter()
        .map(|argv| argv[0].clone())
        .collect();
    assert_eq!(programs, vec!["cargo", "git", EMULATOR]);
    assert_eq!(
        pipeline.transitions(),
        &[
            PipelineState::Idle,
            PipelineState::Building,
            PipelineState::Acquiring,
            PipelineState::Running { index: 0, total: 1 },
            PipelineState::Done,
        ]
    );
}

#[test]
fn single_run_with_present_bundle_does_not_fetch() {
    let tmp = TempDir::new().expect("tempdir");
    let catalog = catalog(tmp.path());
    let fixture = catalog
        .resolve("conformance-instruction-timing")
        .expect("catalog entry");
    let mut pipeline = pipeline(ScriptedRunner::new());

    let acquisition = pipeline
        .run_single(&fixture.path, Some("--autoplay"), Some(catalog.bundle()))
        .expect("single run passes");
    assert_eq!(acquisition, Some(Acquisition::AlreadyPresent));
    assert_eq!(clones(pipeline.runner()), 0);
}

#[test]
fn failed_fetch_skips_the_single_run() {
    let tmp = TempDir::new().expect("tempdir");
    let catalog = catalog(&tmp.path().join("gb-test-roms"));
    let fixture = catalog
        .resolve("conformance-instruction-timing")
        .expect("catalog entry");
    let mut pipeline = pipeline(ScriptedRunner::new().fail_when("git", 128));

    let err = pipeline
        .run_single(&fixture.path, None, Some(catalog.bundle()))
        .unwrap_err();
    assert!(matches!(err, HarnessError::AcquisitionFailure { .. }), "{err:?}");
    assert!(emulator_runs(pipeline.runner()).is_empty());
}
