//! Builder pattern for creating rule sets.
//!
//! This module provides ergonomic builders for constructing rule sets
//! and their constraints with a fluent API.

use crate::{ConstraintKind, ConstraintRule, RowSchema, RuleSet};

/// Builder for creating a `RuleSet`.
///
/// # Example
///
/// ```rust
/// use dq_core::{ConstraintRule, RuleSetBuilder};
///
/// let rules = RuleSetBuilder::new("orders")
///     .version("2.0.0")
///     .description("Nightly order export")
///     .constraint(ConstraintRule::range("qty_non_negative", "qty", Some(0.0), None))
///     .build();
///
/// assert_eq!(rules.version, "2.0.0");
/// ```
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    name: String,
    version: Option<String>,
    description: Option<String>,
    constraints: Vec<ConstraintRule>,
    row_schema: Option<RowSchema>,
}

impl RuleSetBuilder {
    /// Creates a new builder with an empty constraint list and the default row schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Starts from an existing rule set.
    pub fn from_rule_set(rules: RuleSet) -> Self {
        Self {
            name: rules.name,
            version: Some(rules.version),
            description: rules.description,
            constraints: rules.constraints,
            row_schema: Some(rules.row_schema),
        }
    }

    /// Sets the rule set version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the rule set description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a constraint.
    pub fn constraint(mut self, constraint: ConstraintRule) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Appends multiple constraints.
    pub fn constraints(mut self, constraints: Vec<ConstraintRule>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Removes a constraint by name, keeping the order of the others.
    pub fn without_constraint(mut self, name: &str) -> Self {
        self.constraints.retain(|c| c.name != name);
        self
    }

    /// Sets the row schema.
    pub fn row_schema(mut self, schema: RowSchema) -> Self {
        self.row_schema = Some(schema);
        self
    }

    /// Builds the rule set.
    pub fn build(self) -> RuleSet {
        RuleSet {
            name: self.name,
            version: self.version.unwrap_or_else(|| "1.0.0".to_string()),
            description: self.description,
            constraints: self.constraints,
            row_schema: self.row_schema.unwrap_or_default(),
        }
    }
}

impl ConstraintRule {
    /// Creates a constraint from its parts.
    pub fn new(name: impl Into<String>, column: impl Into<String>, check: ConstraintKind) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            check,
        }
    }

    /// Column must not contain null or blank values.
    pub fn not_null(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(name, column, ConstraintKind::NotNull)
    }

    /// Column must not contain duplicate values.
    pub fn unique(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::new(name, column, ConstraintKind::Unique)
    }

    /// Column values must lie within inclusive bounds.
    pub fn range(
        name: impl Into<String>,
        column: impl Into<String>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        Self::new(name, column, ConstraintKind::Range { min, max })
    }

    /// Column values must belong to a fixed set.
    pub fn in_set<S: Into<String>>(
        name: impl Into<String>,
        column: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            column,
            ConstraintKind::InSet {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Column values must match a regex and optionally parse as a date.
    pub fn pattern(
        name: impl Into<String>,
        column: impl Into<String>,
        regex: impl Into<String>,
        date_format: Option<String>,
    ) -> Self {
        Self::new(
            name,
            column,
            ConstraintKind::Pattern {
                regex: regex.into(),
                date_format,
            },
        )
    }
}
