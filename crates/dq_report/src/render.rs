//! Archival renderings of a verdict.
//!
//! Rendering never inspects the data again: everything printed comes from
//! the [`Verdict`] and the explicit [`ReportMeta`].

use chrono::{DateTime, Utc};
use dq_core::{ConstraintResult, Verdict};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Label for a passing verdict.
pub const STATUS_PASSED: &str = "ALL PASSED";

/// Label for a failing verdict.
pub const STATUS_FAILED: &str = "ISSUES FOUND";

/// Values shown per failing constraint in the text report.
const TEXT_SAMPLE_VALUES: usize = 5;

/// Context printed alongside a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Dataset label (usually the rule set name or the input file)
    pub dataset: String,
    /// When the run finished
    pub generated_at: DateTime<Utc>,
}

impl ReportMeta {
    /// Creates report metadata.
    pub fn new(dataset: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            dataset: dataset.into(),
            generated_at,
        }
    }

    /// Timestamp as shown in reports, minute precision.
    pub fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

/// `ALL PASSED` or `ISSUES FOUND`.
pub fn status_label(verdict: &Verdict) -> &'static str {
    if verdict.overall_success {
        STATUS_PASSED
    } else {
        STATUS_FAILED
    }
}

fn sample_values(result: &ConstraintResult) -> String {
    let values: Vec<String> = result
        .sample
        .iter()
        .take(TEXT_SAMPLE_VALUES)
        .map(|o| format!("'{}' (line {})", o.value, o.row + 2))
        .collect();
    values.join(", ")
}

/// How a report line should be emphasized by a terminal renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Rules, labels and figures
    Plain,
    /// Report and section titles
    Heading,
    /// Something that passed
    Passed,
    /// Something that failed
    Failed,
    /// Secondary detail
    Muted,
}

/// One line of a text report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// Emphasis hint
    pub tone: Tone,
    /// Line content, without a trailing newline
    pub text: String,
}

/// Plain-text rendering of a verdict.
///
/// The archive writes it through [`fmt::Display`]; terminals can style the
/// same [`lines`](Self::lines) by tone.
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a> {
    verdict: &'a Verdict,
    meta: &'a ReportMeta,
}

impl<'a> TextReport<'a> {
    /// Wraps a verdict for display.
    pub fn new(verdict: &'a Verdict, meta: &'a ReportMeta) -> Self {
        Self { verdict, meta }
    }

    /// The report, line by line.
    pub fn lines(&self) -> Vec<ReportLine> {
        let verdict = self.verdict;
        let counts = &verdict.counts;
        let rule = "=".repeat(60);
        let thin = "-".repeat(60);
        let outcome = if verdict.overall_success {
            Tone::Passed
        } else {
            Tone::Failed
        };

        let mut lines = Vec::new();
        let mut push = |tone: Tone, text: String| lines.push(ReportLine { tone, text });

        push(Tone::Plain, rule.clone());
        push(Tone::Heading, "  DATA QUALITY REPORT".to_string());
        push(Tone::Plain, rule.clone());
        push(Tone::Plain, format!("  Dataset   : {}", self.meta.dataset));
        push(Tone::Plain, format!("  Timestamp : {}", self.meta.timestamp()));
        push(outcome, format!("  Overall   : {}", status_label(verdict)));
        push(Tone::Plain, String::new());
        push(
            Tone::Plain,
            format!(
                "  Constraints : {} passed / {} failed (of {})",
                counts.constraints_passed, counts.constraints_failed, counts.constraints_total
            ),
        );
        push(
            Tone::Plain,
            format!(
                "  Rows        : {} valid / {} invalid rows (of {}), {} field error(s)",
                counts.rows_valid, counts.rows_invalid, counts.rows_total, counts.field_errors
            ),
        );

        if counts.constraints_failed > 0 {
            push(Tone::Plain, thin.clone());
            push(Tone::Heading, "  Failed constraints".to_string());
            for result in verdict.failed_constraints() {
                push(Tone::Plain, String::new());
                push(Tone::Failed, format!("  x {} ({})", result.name, result.kind));
                push(Tone::Plain, format!("      Column            : {}", result.column));
                push(
                    Tone::Plain,
                    format!("      Unexpected count  : {}", result.unexpected_count),
                );
                push(
                    Tone::Plain,
                    format!("      Unexpected percent: {:.2}%", result.unexpected_percent()),
                );
                push(
                    Tone::Muted,
                    format!("      Sample values     : {}", sample_values(result)),
                );
            }
        }

        if counts.constraints_passed > 0 {
            push(Tone::Plain, thin.clone());
            push(Tone::Heading, "  Passed constraints".to_string());
            for result in verdict.passed_constraints() {
                push(
                    Tone::Passed,
                    format!("  + {} (column: {})", result.name, result.column),
                );
            }
        }

        if !verdict.row_failures.is_empty() {
            push(Tone::Plain, thin);
            push(
                Tone::Heading,
                format!("  Row errors (first {} invalid rows)", verdict.row_failures.len()),
            );
            for row in &verdict.row_failures {
                for error in &row.errors {
                    push(
                        Tone::Failed,
                        format!(
                            "  Line {:>6} | {:<15} | {}",
                            row.line(),
                            error.field,
                            error.message
                        ),
                    );
                }
            }
            if verdict.omitted_row_failures > 0 {
                push(
                    Tone::Muted,
                    format!("  ... and {} more invalid rows", verdict.omitted_row_failures),
                );
            }
        }

        push(Tone::Plain, rule);
        lines
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

/// Renders the plain-text report written to the archive.
pub fn render_text(verdict: &Verdict, meta: &ReportMeta) -> String {
    TextReport::new(verdict, meta).to_string()
}

/// Renders the archived JSON document: metadata plus the full verdict.
pub fn render_json(verdict: &Verdict, meta: &ReportMeta) -> serde_json::Result<String> {
    let document = json!({
        "dataset": meta.dataset,
        "generated_at": meta.generated_at,
        "status": status_label(verdict),
        "verdict": verdict,
    });
    serde_json::to_string_pretty(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dq_core::{FieldError, OffendingValue, RowResult, VerdictCounts};
    use pretty_assertions::assert_eq;

    fn meta() -> ReportMeta {
        ReportMeta::new(
            "amazon_sales",
            Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap(),
        )
    }

    fn failing_verdict() -> Verdict {
        let qty = ConstraintResult {
            name: "qty_non_negative".to_string(),
            kind: "range".to_string(),
            column: "qty".to_string(),
            success: false,
            element_count: 100,
            unexpected_count: 3,
            sample: vec![
                OffendingValue {
                    row: 7,
                    value: "-1".to_string(),
                },
                OffendingValue {
                    row: 42,
                    value: "-2".to_string(),
                },
            ],
        };
        let currency = ConstraintResult {
            name: "currency_is_inr".to_string(),
            kind: "in_set".to_string(),
            column: "currency".to_string(),
            success: true,
            element_count: 100,
            unexpected_count: 0,
            sample: vec![],
        };
        Verdict {
            overall_success: false,
            counts: VerdictCounts {
                constraints_total: 2,
                constraints_passed: 1,
                constraints_failed: 1,
                rows_total: 100,
                rows_valid: 97,
                rows_invalid: 3,
                field_errors: 3,
            },
            constraints: vec![qty.clone(), currency],
            constraint_failures: vec![qty],
            row_failures: vec![RowResult::from_errors(
                7,
                vec![FieldError::new("qty", "Qty cannot be negative: -1", "-1")],
            )],
            omitted_row_failures: 2,
            omitted_constraint_failures: 0,
        }
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(meta().timestamp(), "2024-05-01 06:30 UTC");
    }

    #[test]
    fn test_render_text_failing() {
        let text = render_text(&failing_verdict(), &meta());

        assert!(text.contains("Overall   : ISSUES FOUND"));
        assert!(text.contains("Constraints : 1 passed / 1 failed (of 2)"));
        assert!(text.contains("Rows        : 97 valid / 3 invalid rows (of 100), 3 field error(s)"));
        assert!(text.contains("x qty_non_negative (range)"));
        assert!(text.contains("Unexpected percent: 3.00%"));
        assert!(text.contains("'-1' (line 9), '-2' (line 44)"));
        assert!(text.contains("+ currency_is_inr (column: currency)"));
        assert!(text.contains("Line      9 | qty             | Qty cannot be negative: -1"));
        assert!(text.contains("... and 2 more invalid rows"));
    }

    #[test]
    fn test_render_text_passing_has_no_failure_sections() {
        let verdict = Verdict {
            overall_success: true,
            counts: VerdictCounts::default(),
            constraints: vec![],
            constraint_failures: vec![],
            row_failures: vec![],
            omitted_row_failures: 0,
            omitted_constraint_failures: 0,
        };
        let text = render_text(&verdict, &meta());

        assert!(text.contains("Overall   : ALL PASSED"));
        assert!(!text.contains("Failed constraints"));
        assert!(!text.contains("Row errors"));
    }

    #[test]
    fn test_lines_carry_tones() {
        let verdict = failing_verdict();
        let meta = meta();
        let report = TextReport::new(&verdict, &meta);
        let lines = report.lines();

        let tone_of = |prefix: &str| {
            lines
                .iter()
                .find(|l| l.text.starts_with(prefix))
                .map(|l| l.tone)
        };
        assert_eq!(tone_of("  Overall"), Some(Tone::Failed));
        assert_eq!(tone_of("  x qty_non_negative"), Some(Tone::Failed));
        assert_eq!(tone_of("  + currency_is_inr"), Some(Tone::Passed));
        assert_eq!(tone_of("  ... and 2 more"), Some(Tone::Muted));

        let joined: String = lines.iter().map(|l| format!("{}\n", l.text)).collect();
        assert_eq!(joined, render_text(&verdict, &meta));
    }

    #[test]
    fn test_render_json_embeds_verdict() {
        let verdict = failing_verdict();
        let json = render_json(&verdict, &meta()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "ISSUES FOUND");
        assert_eq!(value["dataset"], "amazon_sales");
        assert_eq!(value["generated_at"], "2024-05-01T06:30:00Z");

        let back: Verdict = serde_json::from_value(value["verdict"].clone()).unwrap();
        assert_eq!(back, verdict);
    }
}
