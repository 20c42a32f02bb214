//! Unit tests for configuration parsing and validation.

use std::path::PathBuf;

use evalbox::config::HarnessConfig;

fn minimal_toml() -> &'static str {
    r#"
[grading]
baseline_repo = "/srv/baseline"
test_patch = "/srv/patches/test.patch"
golden_patch = "/srv/patches/golden.patch"
build_command = "lake build"
test_command = "lake test"
"#
}

// ─── Parsing and defaults ──────────────────────────────────────────────

#[test]
fn minimal_config_parses_with_session_defaults() {
    let config = HarnessConfig::from_toml_str(minimal_toml()).expect("config should parse");

    assert_eq!(config.session.shell, "/bin/bash");
    assert_eq!(config.session.poll_interval_ms, 200);
    assert_eq!(config.session.timeout_seconds, 30);
    assert_eq!(config.session.preview_limit_bytes, 10_000);
    assert_eq!(config.session.run_as_uid, 1000);
    assert_eq!(config.session.run_as_gid, 1000);
    assert_eq!(config.grading.build_timeout_seconds, 1500);
    assert_eq!(config.grading.baseline_repo, PathBuf::from("/srv/baseline"));
}

#[test]
fn explicit_values_override_defaults() {
    let raw = r#"
[session]
shell = "/bin/zsh"
poll_interval_ms = 50
timeout_seconds = 5
preview_limit_bytes = 512
run_as_uid = 4242
run_as_gid = 4242

[grading]
baseline_repo = "/repo"
test_patch = "/t.patch"
golden_patch = "/g.patch"
build_command = "make"
test_command = "make test"
workspace_parent = "/scratch"
build_timeout_seconds = 60
"#;
    let config = HarnessConfig::from_toml_str(raw).expect("config should parse");

    assert_eq!(config.session.shell, "/bin/zsh");
    assert_eq!(config.session.run_as_uid, 4242);
    assert_eq!(config.grading.workspace_parent, PathBuf::from("/scratch"));
    assert_eq!(config.grading.build_timeout().as_secs(), 60);
}

// ─── Validation ────────────────────────────────────────────────────────

#[test]
fn missing_grading_section_is_rejected() {
    let result = HarnessConfig::from_toml_str("[session]\nshell = \"/bin/bash\"\n");
    assert!(result.is_err());
}

#[test]
fn zero_poll_interval_is_rejected() {
    let raw = format!("[session]\npoll_interval_ms = 0\n{}", minimal_toml());
    let result = HarnessConfig::from_toml_str(&raw);
    assert!(result.is_err());
}

#[test]
fn zero_timeout_is_rejected() {
    let raw = format!("[session]\ntimeout_seconds = 0\n{}", minimal_toml());
    let result = HarnessConfig::from_toml_str(&raw);
    assert!(result.is_err());
}

#[test]
fn empty_build_command_is_rejected() {
    let raw = r#"
[grading]
baseline_repo = "/repo"
test_patch = "/t.patch"
golden_patch = "/g.patch"
build_command = "  "
test_command = "make test"
"#;
    let result = HarnessConfig::from_toml_str(raw);
    assert!(result.is_err());
}

#[test]
fn load_from_missing_path_is_config_error() {
    let result = HarnessConfig::load_from_path("/nonexistent/evalbox.toml");
    let err = result.err().expect("load should fail");
    assert!(err.to_string().starts_with("config:"));
}
