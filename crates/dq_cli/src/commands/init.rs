use anyhow::{Context, Result};
use dq_core::{RuleSet, RuleSetBuilder};
use dq_parser::{RuleSetFormat, to_string};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

use crate::output;

pub fn execute(output_path: Option<&Path>, format: &str, no_unique: bool) -> Result<ExitCode> {
    info!("Writing built-in rule set as {}", format);

    let mut builder = RuleSetBuilder::from_rule_set(RuleSet::amazon_sales());
    if no_unique {
        builder = builder.without_constraint("order_id_unique");
    }
    let rules = builder.build();

    let format = match format {
        "toml" => RuleSetFormat::Toml,
        _ => RuleSetFormat::Yaml,
    };
    let content = to_string(&rules, format).context("Failed to serialize rule set")?;

    // Output to file or stdout
    if let Some(path) = output_path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to file: {}", path.display()))?;
        output::print_success(&format!("Rule set written to: {}", path.display()));
    } else {
        print!("{content}");
    }

    Ok(ExitCode::SUCCESS)
}
