//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load profile → Validate → (open trace | resolve window → ping → logs | errors)
//!
//! Errors mode:
//!     Parse filters → Query metrics → Filter → Sort → Correlate traces → Report
//!
//! Logs mode:
//!     Range query → Print → (follow: poll every 2s until Ctrl+C)
//!
//! Signals (signals.rs):
//!     SIGINT → stop following
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Filters are parsed before the first request
//! - Report goes to the given writer, diagnostics to the log

pub mod signals;
pub mod startup;

pub use startup::{execute, run};
