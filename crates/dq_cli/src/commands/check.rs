use anyhow::{Context, Result};
use dq_core::ConstraintKind;
use dq_parser::load_rule_set;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

use crate::output;

pub fn execute(rules_path: &Path, format: &str) -> Result<ExitCode> {
    info!("Checking rule set: {}", rules_path.display());

    let rules = load_rule_set(rules_path)
        .with_context(|| format!("Failed to load rule set: {}", rules_path.display()))?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(ExitCode::SUCCESS);
    }

    output::print_success("Rule set is valid");

    println!("\nRule Set Summary:");
    println!("  Name:        {}", rules.name);
    println!("  Version:     {}", rules.version);
    println!(
        "  Description: {}",
        rules.description.as_deref().unwrap_or("N/A")
    );
    println!("  Constraints: {}", rules.constraints.len());

    for rule in &rules.constraints {
        let detail = match &rule.check {
            ConstraintKind::NotNull | ConstraintKind::Unique => String::new(),
            ConstraintKind::Range { min, max } => format!(
                " [{}, {}]",
                min.map_or("-inf".to_string(), |v| v.to_string()),
                max.map_or("+inf".to_string(), |v| v.to_string())
            ),
            ConstraintKind::InSet { values } => format!(" {{{}}}", values.join(", ")),
            ConstraintKind::Pattern { regex, .. } => format!(" /{regex}/"),
        };
        println!(
            "    - {} ({} on {}){}",
            rule.name,
            rule.check.label(),
            rule.column,
            detail
        );
    }

    let schema = &rules.row_schema;
    println!("\nRow Model:");
    println!("  Statuses:              {}", schema.statuses.len());
    println!(
        "  Cancellation statuses: {}",
        schema.cancellation_statuses.join(", ")
    );
    println!(
        "  Fulfilment channels:   {}",
        schema.fulfilment_channels.join(", ")
    );
    println!("  Currencies:            {}", schema.currencies.join(", "));
    println!("  Ship countries:        {}", schema.ship_countries.join(", "));
    println!("  Date format:           {}", schema.date_format);

    Ok(ExitCode::SUCCESS)
}
