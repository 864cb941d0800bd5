//! Parser for data quality rule sets (YAML/TOML formats).
//!
//! This module provides functionality to parse rule sets from YAML and TOML files
//! into the strongly-typed `RuleSet` structure, and to write them back out.
//!
//! # Example
//!
//! ```rust
//! use dq_parser::parse_yaml;
//!
//! let yaml = r#"
//! name: amazon_sales
//! constraints:
//!   - name: order_id_not_null
//!     column: order_id
//!     check:
//!       type: not_null
//!   - name: qty_non_negative
//!     column: qty
//!     check:
//!       type: range
//!       min: 0
//! "#;
//!
//! let rules = parse_yaml(yaml).expect("Failed to parse rule set");
//! assert_eq!(rules.constraints.len(), 2);
//! ```

use dq_core::{RuleSet, RuleSetError};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during rule set parsing.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// Parsed rule set is not well-formed
    #[error("Invalid rule set: {}", render_problems(.0))]
    InvalidRuleSet(Vec<RuleSetError>),
}

fn render_problems(problems: &[RuleSetError]) -> String {
    problems
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported rule set file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Parse a rule set from a YAML string.
pub fn parse_yaml(content: &str) -> Result<RuleSet> {
    let rules: RuleSet = serde_yaml_ng::from_str(content)?;
    Ok(rules)
}

/// Parse a rule set from a TOML string.
///
/// # Example
///
/// ```rust
/// use dq_parser::parse_toml;
///
/// let toml = r#"
/// name = "orders"
///
/// [[constraints]]
/// name = "currency_is_inr"
/// column = "currency"
/// check = { type = "in_set", values = ["INR"] }
/// "#;
///
/// let rules = parse_toml(toml).unwrap();
/// assert_eq!(rules.name, "orders");
/// ```
pub fn parse_toml(content: &str) -> Result<RuleSet> {
    let rules: RuleSet =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(rules)
}

/// Detect the rule set format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `RuleSetFormat::Yaml`
/// * `.toml` → `RuleSetFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<RuleSetFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(RuleSetFormat::Yaml),
        "toml" => Ok(RuleSetFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a rule set from a file with automatic format detection.
///
/// The rule set is parsed only; use [`load_rule_set`] to also check it.
pub fn parse_file(path: &Path) -> Result<RuleSet> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        RuleSetFormat::Yaml => parse_yaml(&content),
        RuleSetFormat::Toml => parse_toml(&content),
    }
}

/// Parse a rule set from a file and reject it unless it is well-formed.
pub fn load_rule_set(path: &Path) -> Result<RuleSet> {
    let rules = parse_file(path)?;
    let problems = rules.check();
    if problems.is_empty() {
        Ok(rules)
    } else {
        Err(ParserError::InvalidRuleSet(problems))
    }
}

/// Serialize a rule set in the given format.
pub fn to_string(rules: &RuleSet, format: RuleSetFormat) -> Result<String> {
    match format {
        RuleSetFormat::Yaml => Ok(serde_yaml_ng::to_string(rules)?),
        RuleSetFormat::Toml => {
            toml::to_string_pretty(rules).map_err(|e| ParserError::TomlError(e.to_string()))
        }
    }
}
