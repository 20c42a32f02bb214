//! Unit tests for JUnit-style report rendering.

use evalbox::grading::report::{render_stage, render_validation_success, VALIDATION_ASSERTIONS};
use evalbox::models::StageResult;

// ─── Single-stage reports ──────────────────────────────────────────────

#[test]
fn failed_stage_renders_failure_block() {
    let stage = StageResult::failed(
        "AgentPatchCompiles",
        "agent patch compilation failed",
        "error: unknown identifier\n".into(),
        String::new(),
    );
    let xml = render_stage(&stage);

    assert!(xml.contains(r#"<testsuite name="AgentPatchCompiles" tests="1" failures="1""#));
    assert!(xml.contains(r#"<failure type="TestFailure" message="agent patch compilation failed"/>"#));
    assert!(xml.contains("error: unknown identifier"));
    assert!(xml.contains(r#"<testcase classname="AgentPatchCompiles" name="testAgentPatchCompiles""#));
}

#[test]
fn passed_stage_renders_zero_failures_and_no_failure_block() {
    let stage = StageResult::passed("Tests", "all good\n".into(), String::new());
    let xml = render_stage(&stage);

    assert!(xml.contains(r#"<testsuite name="Tests" tests="1" failures="0""#));
    assert!(!xml.contains("<failure"));
    assert!(xml.contains("<system-out>all good\n</system-out>"));
}

#[test]
fn stage_output_is_xml_escaped() {
    let stage = StageResult::failed(
        "Tests",
        "expected <foo> & got \"bar\"",
        "if a < b && b > c\n".into(),
        String::new(),
    );
    let xml = render_stage(&stage);

    assert!(xml.contains("expected &lt;foo&gt; &amp; got &quot;bar&quot;"));
    assert!(xml.contains("if a &lt; b &amp;&amp; b &gt; c"));
    assert!(!xml.contains("got \"bar\""));
}

// ─── Validation success report ─────────────────────────────────────────

#[test]
fn validation_success_lists_all_six_assertions() {
    let xml = render_validation_success();

    assert!(xml.contains(r#"<testsuite name="PatchValidation" tests="6" failures="0" errors="0" skipped="0""#));
    for name in VALIDATION_ASSERTIONS {
        assert!(
            xml.contains(&format!(r#"name="test{name}""#)),
            "missing assertion {name}"
        );
    }
}

#[test]
fn validation_assertion_order_is_fixed() {
    assert_eq!(
        VALIDATION_ASSERTIONS,
        [
            "BaselineCompiles",
            "TestPatchApplies",
            "TestPatchFailsTests",
            "GoldenPatchApplies",
            "GoldenPatchCompiles",
            "GoldenPatchPassesTests",
        ]
    );
}
