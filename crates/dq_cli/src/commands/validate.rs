use anyhow::{Context, Result};
use chrono::Utc;
use dq_core::{RuleSet, RunContext};
use dq_parser::load_rule_set;
use dq_report::{
    ArchiveSink, Delivery, FileArchive, NotificationPayload, Notifier, ReportMeta, SlackNotifier,
    render_json, render_text,
};
use dq_validator::Pipeline;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};

use crate::{env_file, output};

const WEBHOOK_VAR: &str = "SLACK_WEBHOOK_URL";

/// Options of the `validate` command.
pub struct ValidateArgs {
    pub input: PathBuf,
    pub rules: Option<PathBuf>,
    pub format: String,
    pub label: Option<String>,
    pub archive_dir: Option<PathBuf>,
    pub webhook_url: Option<String>,
    pub env_file: Option<PathBuf>,
    pub sample_cap: usize,
    pub failure_samples: usize,
    pub timeout_ms: Option<u64>,
    pub jobs: Option<usize>,
}

pub async fn execute(args: ValidateArgs) -> Result<ExitCode> {
    info!("Validating order file: {}", args.input.display());

    // The flag and the process environment win over the env file
    let webhook_url = match (&args.webhook_url, &args.env_file) {
        (Some(url), _) => Some(url.clone()),
        (None, Some(path)) => env_file::load(path)?.remove(WEBHOOK_VAR),
        (None, None) => None,
    };

    let rules = match &args.rules {
        Some(path) => load_rule_set(path)
            .with_context(|| format!("Failed to load rule set: {}", path.display()))?,
        None => RuleSet::amazon_sales(),
    };
    info!(
        "Rule set: {} v{} ({} constraints)",
        rules.name,
        rules.version,
        rules.constraints.len()
    );

    let mut context = RunContext::new()
        .with_sample_cap(args.sample_cap)
        .with_failure_sample_limit(args.failure_samples);
    if let Some(jobs) = args.jobs {
        context = context.with_parallelism(jobs);
    }
    if let Some(ms) = args.timeout_ms {
        context = context.with_budget(Duration::from_millis(ms));
    }

    let label = args.label.clone().unwrap_or_else(|| rules.name.clone());
    let pipeline = Pipeline::new(rules, context).context("Invalid rule set")?;

    let verdict = pipeline
        .run_csv(&args.input)
        .await
        .with_context(|| format!("Validation of {} aborted", args.input.display()))?;

    let meta = ReportMeta::new(label, Utc::now());
    output::print_verdict(&verdict, &meta, &args.format)?;

    // Archival and notification never change the exit code
    if let Some(dir) = &args.archive_dir {
        archive(dir.clone(), &verdict, &meta);
    }
    notify(webhook_url, &verdict, &meta).await;

    Ok(if verdict.overall_success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(crate::EXIT_FAILED)
    })
}

fn archive(dir: PathBuf, verdict: &dq_core::Verdict, meta: &ReportMeta) {
    let text = render_text(verdict, meta);
    let json = match render_json(verdict, meta) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to render JSON report: {}", e);
            return;
        }
    };

    match FileArchive::new(dir).archive(&text, &json) {
        Ok(paths) => {
            for path in paths {
                info!("Archived {}", path.display());
            }
        }
        Err(e) => warn!("{}", e),
    }
}

async fn notify(webhook_url: Option<String>, verdict: &dq_core::Verdict, meta: &ReportMeta) {
    let notifier = match SlackNotifier::new(webhook_url) {
        Ok(notifier) => notifier,
        Err(e) => {
            warn!("Slack notifier unavailable: {}", e);
            return;
        }
    };

    let payload = NotificationPayload::from_verdict(verdict, meta);
    match notifier.notify(&payload).await {
        Ok(Delivery::Sent) => info!("Slack notification delivered"),
        Ok(Delivery::Skipped) => {}
        Err(e) => warn!("Slack notification failed: {}", e),
    }
}
