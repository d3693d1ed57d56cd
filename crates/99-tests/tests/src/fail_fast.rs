use fixtures::Sweep;
use mock::ScriptedRunner;
use pipeline::{HarnessError, PipelineState, Stage};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

use crate::support::{emulator_runs, manifest, pipeline, EMULATOR};

#[test]
fn failing_fixture_stops_the_sweep() {
    let mut pipeline = pipeline(ScriptedRunner::new().fail_when("B.gb", 2));
    let err = pipeline
        .run_sweep(&manifest(Sweep::Compatibility, &["A.gb", "B.gb", "C.gb"]), None)
        .unwrap_err();

    assert_eq!(err.exit_code(), 2);
    assert_eq!(
        err.stage(),
        Some(&Stage::RunFixture {
            index: 1,
            path: PathBuf::from("B.gb")
        })
    );
    assert_eq!(emulator_runs(pipeline.runner()), vec!["A.gb", "B.gb"]);
    assert_eq!(pipeline.state(), PipelineState::Failed(2));
}

#[test]
fn no_fixture_after_a_failure_is_invoked() {
    let names = ["0.gb", "1.gb", "2.gb", "3.gb", "4.gb"];
    for failing in 0..names.len() {
        let mut pipeline = pipeline(ScriptedRunner::new().fail_when(names[failing], 9));
        let err = pipeline
            .run_fixtures(&manifest(Sweep::Compatibility, &names))
            .unwrap_err();

        assert_eq!(err.exit_code(), 9);
        assert_eq!(
            emulator_runs(pipeline.runner()),
            names[..=failing].to_vec(),
            "failing index {failing}"
        );
    }
}

#[test]
fn first_failure_decides_the_status() {
    let mut pipeline = pipeline(
        ScriptedRunner::new()
            .fail_when("A.gb", 3)
            .fail_when("B.gb", 4),
    );
    let err = pipeline
        .run_fixtures(&manifest(Sweep::Compatibility, &["A.gb", "B.gb"]))
        .unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn every_success_means_status_zero() {
    let mut pipeline = pipeline(ScriptedRunner::new());
    let report = pipeline
        .run_sweep(&manifest(Sweep::Compatibility, &["A.gb", "B.gb", "C.gb"]), None)
        .expect("sweep passes");
    assert_eq!(report.fixtures_run, 3);
    assert_eq!(pipeline.state(), PipelineState::Done);
}

#[test]
fn empty_manifest_is_a_vacuous_pass() {
    let mut pipeline = pipeline(ScriptedRunner::new());
    let ran = pipeline
        .run_fixtures(&manifest(Sweep::Compatibility, &[]))
        .expect("empty manifest passes");
    assert_eq!(ran, 0);
    assert!(pipeline.runner().invocations().is_empty());
    assert_eq!(
        pipeline.transitions(),
        &[PipelineState::Idle, PipelineState::Done]
    );
}

#[test]
fn lint_failure_prevents_build_and_runs() {
    let mut pipeline = pipeline(ScriptedRunner::new().fail_when("clippy", 101));
    let err = pipeline
        .run_sweep(&manifest(Sweep::Compatibility, &["A.gb"]), None)
        .unwrap_err();

    assert!(matches!(err, HarnessError::ToolingFailure { stage: Stage::Lint, .. }));
    assert_eq!(pipeline.runner().count_matching("build"), 0);
    assert_eq!(pipeline.runner().count_matching(EMULATOR), 0);
    assert_eq!(
        pipeline.transitions(),
        &[
            PipelineState::Idle,
            PipelineState::Gating,
            PipelineState::Failed(101)
        ]
    );
}

#[test]
fn missing_fixture_surfaces_as_the_emulators_exit() {
    // The harness does not look for the file; the emulator reports it.
    let missing = "/nonexistent/Boxes (PD).gb";
    let mut pipeline = pipeline(ScriptedRunner::new().fail_when(missing, 1));
    let err = pipeline
        .run_single(&PathBuf::from(missing), Some("--autoplay"), None)
        .unwrap_err();

    assert_eq!(err.exit_code(), 1);
    assert_eq!(
        pipeline.runner().argvs().last().cloned(),
        Some(vec![
            EMULATOR.to_owned(),
            "--autoplay".to_owned(),
            missing.to_owned()
        ])
    );
}
