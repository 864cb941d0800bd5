//! # Data Quality Reporting
//!
//! Turns a [`dq_core::Verdict`] into something people read:
//!
//! - an archival text report and a JSON document ([`render_text`], [`render_json`])
//! - a notification payload rendered as a Slack Block Kit message
//! - delivery through a [`Notifier`] and persistence through an [`ArchiveSink`]
//!
//! Rendering is pure. It takes the verdict plus explicit [`ReportMeta`] and
//! never reads the environment or the clock.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use dq_core::{Verdict, VerdictCounts};
//! use dq_report::{NotificationPayload, ReportMeta, render_text};
//!
//! let verdict = Verdict {
//!     overall_success: true,
//!     counts: VerdictCounts::default(),
//!     constraints: vec![],
//!     constraint_failures: vec![],
//!     row_failures: vec![],
//!     omitted_row_failures: 0,
//!     omitted_constraint_failures: 0,
//! };
//! let meta = ReportMeta::new("amazon_sales", Utc::now());
//!
//! assert!(render_text(&verdict, &meta).contains("ALL PASSED"));
//! assert_eq!(NotificationPayload::from_verdict(&verdict, &meta).status, "ALL PASSED");
//! ```

mod archive;
mod notify;
mod payload;
mod render;

pub use archive::*;
pub use notify::*;
pub use payload::*;
pub use render::*;
