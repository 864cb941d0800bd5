//! # Data Quality Core
//!
//! Core data structures and types for the order data quality engine.
//!
//! This crate provides the building blocks shared by the loader, the validators
//! and the reporter. A run evaluates a [`RuleSet`] against a table of order
//! records and condenses the outcome into a single [`Verdict`].
//!
//! ## Key Concepts
//!
//! - **RuleSet**: The declarative rule configuration (dataset constraints and row model)
//! - **ConstraintResult**: Outcome of one column-scoped constraint over the whole dataset
//! - **RowResult**: Outcome of the typed row model applied to a single record
//! - **Verdict**: The aggregated pass/fail outcome plus bounded evidence
//!
//! ## Example
//!
//! ```rust
//! use dq_core::{ConstraintRule, RuleSetBuilder};
//!
//! let rules = RuleSetBuilder::new("orders")
//!     .constraint(ConstraintRule::not_null("order_id_not_null", "order_id"))
//!     .constraint(ConstraintRule::unique("order_id_unique", "order_id"))
//!     .build();
//!
//! assert_eq!(rules.constraints.len(), 2);
//! assert!(rules.check().is_empty());
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod result;
pub mod rules;

pub use builder::*;
pub use context::*;
pub use error::*;
pub use result::*;
pub use rules::*;
