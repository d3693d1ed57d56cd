use mock::ScriptedRunner;
use pipeline::{HarnessConfig, LintPolicy};
use pretty_assertions::assert_eq;

fn config(policy: &str, rules: &str) -> HarnessConfig {
    let src = format!(
        r#"
[toolchain]
format = ["cargo", "fmt"]
build = ["cargo", "build"]

[lint]
command = ["cargo", "clippy", "--"]
policy = "{policy}"
rules = {rules}

[binary]
command = ["target/debug/gameboy"]
mode = "--headless"

[[fixtures.compatibility]]
category = "mapper-1"
path = "/tmp/gb/175 Sprite Parallax Starfield Demo (PD) [C].gb"
"#
    );
    HarnessConfig::from_toml_str(&src, "scenario").expect("parse scenario config")
}

#[test]
fn allow_overlay_adds_one_suppression_per_rule() {
    let config = config("allow", r#"["r1", "r2"]"#);
    let mut pipeline = config
        .pipeline(ScriptedRunner::new())
        .expect("pipeline from config");
    pipeline.make().expect("make passes");

    let lint = pipeline.runner().argvs()[1].clone();
    assert_eq!(lint, vec!["cargo", "clippy", "--", "-A", "r1", "-A", "r2"]);
    assert_eq!(lint.iter().filter(|arg| *arg == "-A").count(), 2);
}

#[test]
fn deny_overlay_escalates_rules() {
    let config = config("deny", r#"["clippy::unwrap_used"]"#);
    assert_eq!(config.lint.as_ref().map(|l| l.policy), Some(LintPolicy::Deny));

    let gate = config.quality_gate().unwrap().expect("gate configured");
    let rendered: Vec<_> = gate.steps().map(|(_, cmd)| cmd.to_string()).collect();
    assert_eq!(
        rendered,
        vec!["cargo fmt", "cargo clippy -- -D clippy::unwrap_used"]
    );
}

#[test]
fn configured_sweep_runs_gate_build_then_binary_with_mode() {
    let config = config("allow", "[]");
    let catalog = config.catalog();
    let mut pipeline = config
        .pipeline(ScriptedRunner::new())
        .expect("pipeline from config");
    pipeline
        .run_compatibility(&catalog)
        .expect("sweep passes");

    assert_eq!(
        pipeline.runner().argvs(),
        vec![
            vec!["cargo", "fmt"],
            vec!["cargo", "clippy", "--"],
            vec!["cargo", "build"],
            vec![
                "target/debug/gameboy",
                "--headless",
                "/tmp/gb/175 Sprite Parallax Starfield Demo (PD) [C].gb"
            ],
        ]
    );
}
