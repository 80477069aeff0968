//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!
//! Consumers:
//!     → logging.rs (EnvFilter + fmt layer on stderr, console or JSON)
//! ```
//!
//! # Design Decisions
//! - Diagnostics never go to stdout, which carries the report
//! - `RUST_LOG` overrides `--log-level`

pub mod logging;

pub use logging::{init_logging, LogFormat, LogLevel};
