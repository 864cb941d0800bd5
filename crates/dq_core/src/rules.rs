//! Declarative rule configuration.
//!
//! A [`RuleSet`] bundles the ordered dataset-level constraints with the
//! parameters of the per-row order model. Rule sets are plain data so they
//! can be parsed from YAML/TOML, built in code, or taken from the built-in
//! [`RuleSet::amazon_sales`] default.

use crate::RuleSetError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Normalized column names of the order table.
pub mod columns {
    /// Order identifier
    pub const ORDER_ID: &str = "order_id";
    /// Order date (`MM-DD-YY`)
    pub const DATE: &str = "date";
    /// Order status
    pub const STATUS: &str = "status";
    /// Fulfilment channel
    pub const FULFILMENT: &str = "fulfilment";
    /// Currency code
    pub const CURRENCY: &str = "currency";
    /// Destination country code
    pub const SHIP_COUNTRY: &str = "ship_country";
    /// Quantity ordered
    pub const QTY: &str = "qty";
    /// Order amount
    pub const AMOUNT: &str = "amount";

    /// Every column the row model reads, in field declaration order.
    pub const ORDER_COLUMNS: [&str; 8] = [
        ORDER_ID,
        DATE,
        STATUS,
        FULFILMENT,
        CURRENCY,
        SHIP_COUNTRY,
        QTY,
        AMOUNT,
    ];

    /// Columns read as text even when every value looks numeric.
    pub const TEXT_COLUMNS: [&str; 6] = [ORDER_ID, DATE, STATUS, FULFILMENT, CURRENCY, SHIP_COUNTRY];
}

/// Order statuses accepted by the default rule set.
pub const ORDER_STATUSES: &[&str] = &[
    "Cancelled",
    "Pending",
    "Pending - Waiting for Pick Up",
    "Shipped",
    "Shipped - Damaged",
    "Shipped - Delivered to Buyer",
    "Shipped - Lost in Transit",
    "Shipped - Out for Delivery",
    "Shipped - Picked Up",
    "Shipped - Rejected by Buyer",
    "Shipped - Returned to Seller",
    "Shipped - Returning to Seller",
    "Shipping",
];

/// Statuses under which a missing amount is legal.
pub const CANCELLATION_STATUSES: &[&str] = &["Cancelled"];

/// Accepted fulfilment channels.
pub const FULFILMENT_CHANNELS: &[&str] = &["Merchant", "Amazon"];

/// Accepted currencies.
pub const CURRENCIES: &[&str] = &["INR"];

/// Accepted destination countries.
pub const SHIP_COUNTRIES: &[&str] = &["IN"];

/// Shape of an order date: two-digit month, day and year.
pub const DATE_REGEX: &str = r"^\d{2}-\d{2}-\d{2}$";

/// `chrono` format of an order date.
pub const DATE_FORMAT: &str = "%m-%d-%y";

fn default_version() -> String {
    "1.0.0".to_string()
}

/// A complete rule configuration for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Name identifying this rule set (also used as the dataset label)
    pub name: String,

    /// Semantic version of the rule set
    #[serde(default = "default_version")]
    pub version: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Dataset-level constraints, evaluated and reported in this order
    #[serde(default)]
    pub constraints: Vec<ConstraintRule>,

    /// Parameters of the per-row order model
    #[serde(default)]
    pub row_schema: RowSchema,
}

/// A named, column-scoped predicate evaluated once over the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRule {
    /// Unique constraint name
    pub name: String,

    /// Normalized name of the target column
    pub column: String,

    /// The predicate and its parameters
    pub check: ConstraintKind,
}

/// Supported dataset-level predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// No null or blank values
    NotNull,

    /// No value appears more than once
    Unique,

    /// Numeric value within inclusive bounds; nulls are skipped
    Range {
        /// Lower bound (inclusive)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Upper bound (inclusive)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },

    /// Value is one of a fixed set; nulls are skipped
    InSet {
        /// Accepted values
        values: Vec<String>,
    },

    /// Value matches a regex and, optionally, parses with a date format
    Pattern {
        /// Regular expression the whole value must match
        regex: String,
        /// `chrono` format the value must also parse with
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date_format: Option<String>,
    },
}

impl ConstraintKind {
    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            ConstraintKind::NotNull => "not_null",
            ConstraintKind::Unique => "unique",
            ConstraintKind::Range { .. } => "range",
            ConstraintKind::InSet { .. } => "in_set",
            ConstraintKind::Pattern { .. } => "pattern",
        }
    }
}

/// Parameters of the typed per-row order model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowSchema {
    /// Accepted order statuses
    pub statuses: Vec<String>,
    /// Statuses that denote a cancellation (amount may be absent)
    pub cancellation_statuses: Vec<String>,
    /// Accepted fulfilment channels
    pub fulfilment_channels: Vec<String>,
    /// Accepted currencies
    pub currencies: Vec<String>,
    /// Accepted destination countries
    pub ship_countries: Vec<String>,
    /// Regex the order date must match
    pub date_regex: String,
    /// `chrono` format the order date must parse with
    pub date_format: String,
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for RowSchema {
    fn default() -> Self {
        Self {
            statuses: owned(ORDER_STATUSES),
            cancellation_statuses: owned(CANCELLATION_STATUSES),
            fulfilment_channels: owned(FULFILMENT_CHANNELS),
            currencies: owned(CURRENCIES),
            ship_countries: owned(SHIP_COUNTRIES),
            date_regex: DATE_REGEX.to_string(),
            date_format: DATE_FORMAT.to_string(),
        }
    }
}

impl RowSchema {
    /// Returns true if the status denotes a cancelled order.
    pub fn is_cancellation(&self, status: &str) -> bool {
        self.cancellation_statuses.iter().any(|s| s == status)
    }
}

impl RuleSet {
    /// The built-in rule set for the Amazon sales order export.
    ///
    /// Order ID not null and unique, non-negative quantity and amount,
    /// enumerated status/fulfilment/currency/country, and `MM-DD-YY` dates.
    pub fn amazon_sales() -> Self {
        use columns::*;

        let schema = RowSchema::default();
        RuleSet {
            name: "amazon_sales".to_string(),
            version: default_version(),
            description: Some("Amazon sales order export".to_string()),
            constraints: vec![
                ConstraintRule::not_null("order_id_not_null", ORDER_ID),
                ConstraintRule::unique("order_id_unique", ORDER_ID),
                ConstraintRule::range("qty_non_negative", QTY, Some(0.0), None),
                ConstraintRule::range("amount_non_negative", AMOUNT, Some(0.0), None),
                ConstraintRule::in_set("status_in_set", STATUS, schema.statuses.clone()),
                ConstraintRule::in_set(
                    "fulfilment_in_set",
                    FULFILMENT,
                    schema.fulfilment_channels.clone(),
                ),
                ConstraintRule::in_set("currency_is_inr", CURRENCY, schema.currencies.clone()),
                ConstraintRule::in_set(
                    "ship_country_is_in",
                    SHIP_COUNTRY,
                    schema.ship_countries.clone(),
                ),
                ConstraintRule::pattern(
                    "date_format",
                    DATE,
                    schema.date_regex.clone(),
                    Some(schema.date_format.clone()),
                ),
            ],
            row_schema: schema,
        }
    }

    /// Looks up a constraint by name.
    pub fn constraint(&self, name: &str) -> Option<&ConstraintRule> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Distinct target columns of all constraints, in first-use order.
    pub fn constraint_columns(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.constraints
            .iter()
            .map(|c| c.column.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Checks that the rule set is well-formed.
    ///
    /// Returns every problem found. An empty list means the rule set is usable.
    pub fn check(&self) -> Vec<RuleSetError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(RuleSetError::EmptyName);
        }

        let mut names = HashSet::new();
        for rule in &self.constraints {
            if !names.insert(rule.name.as_str()) {
                errors.push(RuleSetError::DuplicateConstraint(rule.name.clone()));
            }
            if rule.column.trim().is_empty() {
                errors.push(RuleSetError::EmptyColumn(rule.name.clone()));
            }
            match &rule.check {
                ConstraintKind::InSet { values } if values.is_empty() => {
                    errors.push(RuleSetError::EmptyValueSet(rule.name.clone()));
                }
                ConstraintKind::Range {
                    min: Some(min),
                    max: Some(max),
                } if min > max => {
                    errors.push(RuleSetError::InvalidRange {
                        constraint: rule.name.clone(),
                        min: *min,
                        max: *max,
                    });
                }
                ConstraintKind::Pattern { regex, .. } => {
                    if let Err(e) = Regex::new(regex) {
                        errors.push(RuleSetError::InvalidRegex {
                            target: rule.name.clone(),
                            error: e.to_string(),
                        });
                    }
                }
                _ => {}
            }
        }

        let schema = &self.row_schema;
        let lists: [(&'static str, &Vec<String>); 4] = [
            ("statuses", &schema.statuses),
            ("fulfilment_channels", &schema.fulfilment_channels),
            ("currencies", &schema.currencies),
            ("ship_countries", &schema.ship_countries),
        ];
        for (label, list) in lists {
            if list.is_empty() {
                errors.push(RuleSetError::EmptyRowSchemaList(label));
            }
        }
        if let Err(e) = Regex::new(&schema.date_regex) {
            errors.push(RuleSetError::InvalidRegex {
                target: "row_schema.date_regex".to_string(),
                error: e.to_string(),
            });
        }

        errors
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::amazon_sales()
    }
}
