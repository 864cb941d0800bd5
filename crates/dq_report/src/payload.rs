//! Notification payload and its Slack Block Kit rendering.

use crate::{ReportMeta, status_label};
use dq_core::{OffendingValue, Verdict};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Row errors shown in a Slack message.
pub const SLACK_ROW_ERRORS: usize = 5;

/// Offending values shown per failed constraint in a Slack message.
pub const SLACK_SAMPLE_VALUES: usize = 3;

const COLOR_PASSED: &str = "#36a64f";
const COLOR_FAILED: &str = "#dc3545";

/// A failing constraint, as listed in a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSummary {
    /// Constraint name
    pub name: String,
    /// Target column
    pub column: String,
    /// Number of offending values
    pub unexpected_count: usize,
    /// Offending values, as sampled in the verdict
    pub sample: Vec<OffendingValue>,
}

/// A single row error, as listed in a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowErrorSummary {
    /// Line in the source file
    pub line: usize,
    /// Failing field
    pub field: String,
    /// Error message
    pub message: String,
}

/// Everything a notification says about a run.
///
/// Built from the verdict alone; counts and samples are copied, never
/// recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Dataset label
    pub dataset: String,
    /// Run timestamp, as displayed
    pub timestamp: String,
    /// Verdict outcome
    pub overall_success: bool,
    /// `ALL PASSED` or `ISSUES FOUND`
    pub status: String,
    /// Constraints that passed
    pub constraints_passed: usize,
    /// Constraints that failed
    pub constraints_failed: usize,
    /// Rows that passed the row model
    pub rows_valid: usize,
    /// Rows that failed the row model
    pub rows_invalid: usize,
    /// Failing constraints kept in the verdict
    pub failed_constraints: Vec<ConstraintSummary>,
    /// Failing constraints not listed
    pub omitted_constraints: usize,
    /// Errors of the failing rows kept in the verdict, in row order
    pub row_errors: Vec<RowErrorSummary>,
    /// Row errors of the rows the verdict omitted
    pub omitted_row_errors: usize,
}

impl NotificationPayload {
    /// Builds the payload for a verdict.
    pub fn from_verdict(verdict: &Verdict, meta: &ReportMeta) -> Self {
        let counts = &verdict.counts;

        let failed_constraints = verdict
            .constraint_failures
            .iter()
            .map(|c| ConstraintSummary {
                name: c.name.clone(),
                column: c.column.clone(),
                unexpected_count: c.unexpected_count,
                sample: c.sample.clone(),
            })
            .collect();

        let row_errors: Vec<RowErrorSummary> = verdict
            .row_failures
            .iter()
            .flat_map(|row| {
                row.errors.iter().map(|e| RowErrorSummary {
                    line: row.line(),
                    field: e.field.clone(),
                    message: e.message.clone(),
                })
            })
            .collect();

        Self {
            dataset: meta.dataset.clone(),
            timestamp: meta.timestamp(),
            overall_success: verdict.overall_success,
            status: status_label(verdict).to_string(),
            constraints_passed: counts.constraints_passed,
            constraints_failed: counts.constraints_failed,
            rows_valid: counts.rows_valid,
            rows_invalid: counts.rows_invalid,
            failed_constraints,
            omitted_constraints: verdict.omitted_constraint_failures,
            omitted_row_errors: counts.field_errors.saturating_sub(row_errors.len()),
            row_errors,
        }
    }

    fn mark(ok: bool) -> &'static str {
        if ok { "✅" } else { "❌" }
    }

    /// Renders the payload as a Slack message with one colored attachment.
    pub fn to_slack_message(&self) -> Value {
        let mut blocks = vec![
            json!({
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": format!("{} Data Quality Report: {}", Self::mark(self.overall_success), self.status),
                    "emoji": true,
                },
            }),
            json!({
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": format!("*Dataset:*\n{}", self.dataset) },
                    { "type": "mrkdwn", "text": format!("*Timestamp:*\n{}", self.timestamp) },
                ],
            }),
            json!({ "type": "divider" }),
            json!({
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": "*Dataset Constraints*" },
                    {
                        "type": "mrkdwn",
                        "text": format!(
                            "{} {} passed / {} failed",
                            Self::mark(self.constraints_failed == 0),
                            self.constraints_passed,
                            self.constraints_failed
                        ),
                    },
                ],
            }),
        ];

        if !self.failed_constraints.is_empty() {
            let mut text: Vec<String> = self
                .failed_constraints
                .iter()
                .map(|c| {
                    let mut line = format!("• *{}* (`{}`): {} unexpected", c.name, c.column, c.unexpected_count);
                    if !c.sample.is_empty() {
                        let values: Vec<String> = c
                            .sample
                            .iter()
                            .take(SLACK_SAMPLE_VALUES)
                            .map(|o| format!("`{}`", o.value))
                            .collect();
                        line.push_str(&format!(" e.g. {}", values.join(", ")));
                    }
                    line
                })
                .collect();
            if self.omitted_constraints > 0 {
                text.push(format!("_… and {} more constraints_", self.omitted_constraints));
            }
            blocks.push(json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("*Failed Constraints:*\n{}", text.join("\n")) },
            }));
        }

        blocks.push(json!({
            "type": "section",
            "fields": [
                { "type": "mrkdwn", "text": "*Row Validation*" },
                {
                    "type": "mrkdwn",
                    "text": format!(
                        "{} {} valid / {} invalid rows",
                        Self::mark(self.rows_invalid == 0),
                        self.rows_valid,
                        self.rows_invalid
                    ),
                },
            ],
        }));

        if !self.row_errors.is_empty() {
            let mut text: Vec<String> = self
                .row_errors
                .iter()
                .take(SLACK_ROW_ERRORS)
                .map(|e| format!("• Row {}: *{}*: {}", e.line, e.field, e.message))
                .collect();
            let hidden = self.omitted_row_errors
                + self.row_errors.len().saturating_sub(SLACK_ROW_ERRORS);
            if hidden > 0 {
                text.push(format!("_… and {} more errors_", hidden));
            }
            blocks.push(json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("*Row Errors (sample):*\n{}", text.join("\n")) },
            }));
        }

        let color = if self.overall_success {
            COLOR_PASSED
        } else {
            COLOR_FAILED
        };
        json!({ "attachments": [{ "color": color, "blocks": blocks }] })
    }
}
