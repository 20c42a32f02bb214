#![forbid(unsafe_code)]

//! `evalbox` — remote execution substrate binary.
//!
//! Runs the grading workflows against the configured baseline repository,
//! or executes one-shot commands through an interactive shell session.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use evalbox::config::HarnessConfig;
use evalbox::grading::GradingPipeline;
use evalbox::models::GradingOutcome;
use evalbox::session::{SessionManager, SessionOptions};
use evalbox::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "evalbox", about = "Agent-evaluation execution substrate", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply the test patch and grade the workspace (build + test).
    Grade {
        /// File to write the JUnit report to; stdout when omitted.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Cross-check that the test and golden patches behave as claimed.
    Validate {
        /// File to write the JUnit report to; stdout when omitted.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Run a single command through an interactive shell session.
    Exec {
        /// Shell command to execute.
        command: String,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let config = HarnessConfig::load_from_path(&args.config)?;
    info!("configuration loaded");

    match args.command {
        Commands::Grade { report } => {
            let pipeline = GradingPipeline::new(config.grading);
            let outcome = pipeline.run_grading().await?;
            emit_outcome(&outcome, report.as_deref())?;
        }
        Commands::Validate { report } => {
            let pipeline = GradingPipeline::new(config.grading);
            let outcome = pipeline.validate_patches().await?;
            emit_outcome(&outcome, report.as_deref())?;
        }
        Commands::Exec { command } => {
            let options = SessionOptions::from_config(&config.session);
            let mut manager = SessionManager::new(options);
            let result = manager.execute(Some(command.as_str()), false).await?;
            if let Some(output) = result.output {
                println!("{output}");
            }
            if let Some(error) = result.error {
                if !error.is_empty() {
                    eprintln!("{error}");
                }
            }
            if let Some(system) = result.system {
                warn!(system = %system, "operational note");
            }
        }
    }

    Ok(())
}

/// Write the report to the requested destination and log the verdict.
fn emit_outcome(outcome: &GradingOutcome, report: Option<&std::path::Path>) -> Result<()> {
    match report {
        Some(path) => {
            std::fs::write(path, &outcome.junit)
                .map_err(|err| AppError::Io(format!("failed to write report: {err}")))?;
            info!(report = %path.display(), "report written");
        }
        None => println!("{}", outcome.junit),
    }

    if outcome.passed {
        info!("all stages passed");
    } else {
        warn!(stage = outcome.failed_stage.as_deref(), "workflow failed");
    }
    Ok(())
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
