//! # Data Quality Validator
//!
//! Validation engine for order exports. This crate loads a CSV table and
//! checks it on two independent layers:
//!
//! - Dataset constraints (not-null, uniqueness, ranges, value sets, date patterns)
//! - The typed row model (every field of every order, with conditional rules)
//!
//! Both result sequences are aggregated into a single [`dq_core::Verdict`].
//!
//! ## Example
//!
//! ```rust
//! use dq_core::{RuleSet, RunContext};
//! use dq_validator::{DataRow, DataSet, DataValue, Pipeline};
//!
//! let mut row = DataRow::new();
//! row.insert("order_id".into(), "171-9198151-1101146".into());
//! row.insert("date".into(), "04-30-22".into());
//! row.insert("status".into(), "Cancelled".into());
//! row.insert("fulfilment".into(), "Merchant".into());
//! row.insert("currency".into(), "INR".into());
//! row.insert("ship_country".into(), "IN".into());
//! row.insert("qty".into(), DataValue::Int(0));
//! row.insert("amount".into(), DataValue::Null);
//!
//! let pipeline = Pipeline::new(RuleSet::amazon_sales(), RunContext::new()).unwrap();
//! let verdict = pipeline.run_blocking(&DataSet::from_rows(vec![row])).unwrap();
//!
//! assert!(verdict.overall_success);
//! ```

mod aggregate;
mod cancel;
mod constraints;
mod dataset;
mod engine;
mod loader;
mod record;
mod rows;

pub use aggregate::*;
pub use cancel::*;
pub use constraints::*;
pub use dataset::*;
pub use engine::*;
pub use loader::*;
pub use record::*;
pub use rows::*;
