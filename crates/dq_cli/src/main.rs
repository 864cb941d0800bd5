mod commands;
mod env_file;
mod output;

use clap::{Parser, Subcommand};
use dq_core::{DEFAULT_FAILURE_SAMPLE_LIMIT, DEFAULT_SAMPLE_CAP, PipelineError};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Validation ran and found failures.
pub const EXIT_FAILED: u8 = 1;
/// Nothing was validated: bad input, bad rules, missing columns.
pub const EXIT_FATAL: u8 = 2;
/// The run exceeded its time budget.
pub const EXIT_TIMEOUT: u8 = 3;

/// How long cancelled workers get to wind down before the process exits.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "dq")]
#[command(version, about = "Order data quality validation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an order export against a rule set
    Validate {
        /// Path to the order CSV file
        input: PathBuf,

        /// Rule set file (YAML or TOML); defaults to the built-in Amazon sales rules
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Dataset label used in reports (defaults to the rule set name)
        #[arg(long)]
        label: Option<String>,

        /// Directory to archive dq_report.txt and dq_verdict.json into
        #[arg(long)]
        archive_dir: Option<PathBuf>,

        /// Slack incoming webhook URL
        #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
        webhook_url: Option<String>,

        /// Dotenv-style file to read SLACK_WEBHOOK_URL from when it is not
        /// otherwise set
        #[arg(long)]
        env_file: Option<PathBuf>,

        /// Offending values kept per constraint
        #[arg(long, default_value_t = DEFAULT_SAMPLE_CAP)]
        sample_cap: usize,

        /// Failing constraints and failing rows kept in the report
        #[arg(long, default_value_t = DEFAULT_FAILURE_SAMPLE_LIMIT)]
        failure_samples: usize,

        /// Wall-clock budget for loading and validation, in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Number of row-validation tasks (defaults to available cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Check a rule set file without validating data
    Check {
        /// Path to the rule set file (YAML or TOML)
        rules: PathBuf,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Write the built-in rule set as a starting point
    Init {
        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rule set format: yaml, toml
        #[arg(short, long, default_value = "yaml", value_parser = ["yaml", "toml"])]
        format: String,

        /// Leave out the order ID uniqueness constraint
        #[arg(long)]
        no_unique: bool,
    },
}

/// Maps a fatal error to its exit code.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PipelineError>() {
        Some(e) if e.is_timeout() => EXIT_TIMEOUT,
        _ => EXIT_FATAL,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Logs go to stderr so that `--format json` output stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            output::print_error(&format!("Error: Failed to start async runtime: {e}"));
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let result = runtime.block_on(run(cli.command));
    // Blocking workers of a timed-out run stop at their next cancellation
    // check; never wait for them longer than the grace period.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    match result {
        Ok(code) => code,
        Err(err) => {
            output::print_error(&format!("Error: {err:#}"));
            ExitCode::from(exit_code_for(&err))
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Validate {
            input,
            rules,
            format,
            label,
            archive_dir,
            webhook_url,
            env_file,
            sample_cap,
            failure_samples,
            timeout_ms,
            jobs,
        } => {
            commands::validate::execute(commands::validate::ValidateArgs {
                input,
                rules,
                format,
                label,
                archive_dir,
                webhook_url,
                env_file,
                sample_cap,
                failure_samples,
                timeout_ms,
                jobs,
            })
            .await
        }

        Commands::Check { rules, format } => commands::check::execute(&rules, &format),

        Commands::Init {
            output,
            format,
            no_unique,
        } => commands::init::execute(output.as_deref(), &format, no_unique),
    }
}
