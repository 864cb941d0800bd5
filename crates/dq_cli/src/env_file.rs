//! Minimal dotenv-style file reading for `--env-file`.
//!
//! Values are looked up, never exported into the process environment.

use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Parses `KEY=VALUE` lines. Blank lines and `#` comments are skipped, an
/// `export ` prefix is allowed and matching surrounding quotes are removed.
pub fn parse(content: &str) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            bail!("line {}: expected KEY=VALUE", number + 1);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("line {}: empty variable name", number + 1);
        }
        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    Ok(vars)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Reads and parses an env file.
pub fn load(path: &Path) -> Result<HashMap<String, String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read env file: {}", path.display()))?;
    parse(&content).with_context(|| format!("Invalid env file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse() {
        let vars = parse(
            "# Slack\nSLACK_WEBHOOK_URL=\"https://hooks.slack.com/services/T/B/X\"\n\nexport DQ_LABEL = 'nightly'\nEMPTY=\n",
        )
        .unwrap();

        assert_eq!(
            vars["SLACK_WEBHOOK_URL"],
            "https://hooks.slack.com/services/T/B/X"
        );
        assert_eq!(vars["DQ_LABEL"], "nightly");
        assert_eq!(vars["EMPTY"], "");
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        let err = parse("SLACK_WEBHOOK_URL\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
        assert!(parse("=value\n").is_err());
    }
}
