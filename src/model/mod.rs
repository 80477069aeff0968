//! Error record model.
//!
//! # Data Flow
//! ```text
//! Prometheus samples
//!     → monitoring::metrics (decode into ErrorRecord)
//!     → filter (dedup by fingerprint, code/service/url predicates)
//!     → correlate (traces attached, counts narrowed)
//!     → output::table (rendered once)
//! ```
//!
//! # Design Decisions
//! - Records live for one invocation only
//! - The fingerprint is a lookup key, never an identity

pub mod record;

pub use record::{by_count, ErrorRecord, Operation};
