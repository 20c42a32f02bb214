//! Integration tests for the `run_grading` workflow.
//!
//! Fixtures are real committed git repositories; patches go through
//! `git apply` and commands through `/bin/sh -lc`.

use evalbox::grading::GradingPipeline;
use evalbox::AppError;

use super::test_helpers::{fixture, GOLDEN_PATCH, TEST_PATCH};

#[tokio::test]
async fn grading_passes_when_tests_pass_under_the_test_patch() {
    // The "agent" already fixed the code: src.txt contains `fixed`.
    let fx = fixture("fixed\n", TEST_PATCH, GOLDEN_PATCH);
    let pipeline = GradingPipeline::new(fx.config("true", "sh run_tests.sh"));

    let outcome = pipeline.run_grading().await.expect("workflow runs");

    assert!(outcome.passed);
    assert_eq!(outcome.failed_stage, None);
    assert!(outcome.junit.contains(r#"<testsuite name="Tests" tests="1" failures="0""#));
}

#[tokio::test]
async fn grading_fails_at_tests_when_the_code_is_unfixed() {
    let fx = fixture("broken\n", TEST_PATCH, GOLDEN_PATCH);
    let pipeline = GradingPipeline::new(fx.config("true", "sh run_tests.sh"));

    let outcome = pipeline.run_grading().await.expect("workflow runs");

    assert!(!outcome.passed);
    assert_eq!(outcome.failed_stage.as_deref(), Some("Tests"));
    assert!(outcome.junit.contains("tests failed"));
}

#[tokio::test]
async fn grading_fails_at_build_when_compilation_breaks() {
    let fx = fixture("fixed\n", TEST_PATCH, GOLDEN_PATCH);
    let pipeline = GradingPipeline::new(
        fx.config("echo compiling; echo 'error: boom' 1>&2; false", "sh run_tests.sh"),
    );

    let outcome = pipeline.run_grading().await.expect("workflow runs");

    assert!(!outcome.passed);
    assert_eq!(outcome.failed_stage.as_deref(), Some("AgentPatchCompiles"));
    assert!(outcome.junit.contains("agent patch compilation failed"));
    // The streaming drain accumulates both pipes into the transcript.
    assert!(outcome.junit.contains("compiling"));
    assert!(outcome.junit.contains("error: boom"));
}

#[tokio::test]
async fn unappliable_test_patch_is_a_fatal_error() {
    let garbage = "--- a/missing.txt\n+++ b/missing.txt\n@@ -1 +1 @@\n-x\n+y\n";
    let fx = fixture("fixed\n", garbage, GOLDEN_PATCH);
    let pipeline = GradingPipeline::new(fx.config("true", "sh run_tests.sh"));

    let err = pipeline.run_grading().await.expect_err("apply must fail");
    assert!(matches!(err, AppError::Patch(_)), "got {err}");
}

#[tokio::test]
async fn grading_runs_against_a_fresh_workspace_not_the_baseline() {
    let fx = fixture("fixed\n", TEST_PATCH, GOLDEN_PATCH);
    let pipeline = GradingPipeline::new(fx.config("true", "sh run_tests.sh"));

    pipeline.run_grading().await.expect("workflow runs");

    // The baseline's trivial test suite is untouched by the applied patch.
    let baseline_tests =
        std::fs::read_to_string(fx.baseline.join("run_tests.sh")).expect("read baseline");
    assert_eq!(baseline_tests, "exit 0\n");
}
