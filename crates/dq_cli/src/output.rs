use anyhow::Result;
use colored::*;
use dq_core::Verdict;
use dq_report::{ReportMeta, ReportLine, TextReport, Tone, render_json};

pub fn print_verdict(verdict: &Verdict, meta: &ReportMeta, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", render_json(verdict, meta)?),
        _ => {
            for line in TextReport::new(verdict, meta).lines() {
                println!("{}", styled(&line));
            }
        }
    }
    Ok(())
}

/// Colors a report line; the text itself is the archived report's.
fn styled(line: &ReportLine) -> ColoredString {
    let text = line.text.as_str();
    match line.tone {
        Tone::Plain => text.normal(),
        Tone::Heading => text.bold(),
        Tone::Passed => text.green(),
        Tone::Failed => text.red(),
        Tone::Muted => text.dimmed(),
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}
