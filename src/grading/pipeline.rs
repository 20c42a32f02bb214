//! Grading and validation workflows.
//!
//! Each workflow is a strictly sequential run of named stages; the first
//! failing stage short-circuits the whole workflow with a named
//! [`StageResult`]. Patch-apply and workspace failures are fatal errors
//! rather than stage results: no meaningful partial state exists to report
//! against.

use tracing::{info, info_span};

use crate::config::GradingConfig;
use crate::grading::{command, patch, report, GradingWorkspace};
use crate::models::{GradingOutcome, StageResult};
use crate::Result;

/// Driver for the two grading workflows over one configuration.
pub struct GradingPipeline {
    config: GradingConfig,
}

impl GradingPipeline {
    /// Pipeline over the given grading configuration.
    #[must_use]
    pub fn new(config: GradingConfig) -> Self {
        Self { config }
    }

    /// Grade an agent submission: apply the test patch, then require the
    /// workspace to build and its tests to pass.
    ///
    /// # Errors
    ///
    /// Returns an error for infrastructure failures: workspace copy,
    /// patch application, or a build/test invocation that cannot run.
    pub async fn run_grading(&self) -> Result<GradingOutcome> {
        let span = info_span!("run_grading");
        let _guard = span.enter();
        info!("starting grading workflow");

        let workspace = GradingWorkspace::create(
            &self.config.baseline_repo,
            &self.config.workspace_parent,
        )?;

        patch::apply_patch(workspace.path(), &self.config.test_patch).await?;

        // Build with live output streaming; agent builds can be long and
        // noisy, and stalled-looking runs are hard to debug from a silent
        // capture.
        let build = command::run_streaming(
            &self.config.build_command,
            workspace.path(),
            self.config.build_timeout(),
        )
        .await?;
        if !build.success {
            let stage = StageResult::failed(
                "AgentPatchCompiles",
                "agent patch compilation failed",
                build.stdout,
                build.stderr,
            );
            info!(stage = stage.name, "grading failed at build stage");
            return Ok(GradingOutcome::failure(&stage, report::render_stage(&stage)));
        }
        info!("build succeeded");

        let tests = command::run_captured(
            &self.config.test_command,
            workspace.path(),
            self.config.build_timeout(),
        )
        .await?;
        let stage = if tests.success {
            StageResult::passed("Tests", tests.stdout, tests.stderr)
        } else {
            StageResult::failed("Tests", "tests failed", tests.stdout, tests.stderr)
        };
        info!(stage = stage.name, passed = stage.passed, "test stage complete");

        let junit = report::render_stage(&stage);
        if stage.passed {
            Ok(GradingOutcome::success(junit))
        } else {
            Ok(GradingOutcome::failure(&stage, junit))
        }
    }

    /// Cross-check that the test and golden patches behave as claimed:
    /// the baseline builds, the test patch makes tests fail, and the
    /// golden patch makes them build and pass again.
    ///
    /// # Errors
    ///
    /// Returns an error for infrastructure failures: workspace copy or
    /// reset, patch application, or an invocation that cannot run.
    pub async fn validate_patches(&self) -> Result<GradingOutcome> {
        let span = info_span!("validate_patches");
        let _guard = span.enter();
        info!("starting patch validation workflow");

        let workspace = GradingWorkspace::create(
            &self.config.baseline_repo,
            &self.config.workspace_parent,
        )?;

        let baseline = self.build(&workspace).await?;
        if !baseline.success {
            return Ok(short_circuit(
                "BaselineCompiles",
                "baseline compilation failed",
                baseline,
            ));
        }
        info!("baseline compiled");

        patch::apply_patch(workspace.path(), &self.config.test_patch).await?;

        // Inverted expectation: the test patch must make tests fail
        // against the unfixed baseline.
        let tests = self.test(&workspace).await?;
        if tests.success {
            return Ok(short_circuit(
                "TestPatchFailsTests",
                "test patch did not cause tests to fail",
                tests,
            ));
        }
        info!("tests failed as expected with test patch");

        patch::reset_hard(workspace.path()).await?;
        patch::apply_patch(workspace.path(), &self.config.golden_patch).await?;
        patch::apply_patch(workspace.path(), &self.config.test_patch).await?;

        let golden_build = self.build(&workspace).await?;
        if !golden_build.success {
            return Ok(short_circuit(
                "GoldenPatchCompiles",
                "golden patch compilation failed",
                golden_build,
            ));
        }
        info!("golden patch compiled");

        let golden_tests = self.test(&workspace).await?;
        if !golden_tests.success {
            return Ok(short_circuit(
                "GoldenPatchPassesTests",
                "golden patch did not fix tests",
                golden_tests,
            ));
        }
        info!("all validation assertions passed");

        Ok(GradingOutcome::success(report::render_validation_success()))
    }

    async fn build(&self, workspace: &GradingWorkspace) -> Result<command::CommandOutput> {
        command::run_captured(
            &self.config.build_command,
            workspace.path(),
            self.config.build_timeout(),
        )
        .await
    }

    async fn test(&self, workspace: &GradingWorkspace) -> Result<command::CommandOutput> {
        command::run_captured(
            &self.config.test_command,
            workspace.path(),
            self.config.build_timeout(),
        )
        .await
    }

}

/// Build the short-circuit outcome for a failed validation stage.
fn short_circuit(name: &str, message: &str, output: command::CommandOutput) -> GradingOutcome {
    let stage = StageResult::failed(name, message, output.stdout, output.stderr);
    info!(stage = stage.name, "validation failed");
    GradingOutcome::failure(&stage, report::render_stage(&stage))
}
