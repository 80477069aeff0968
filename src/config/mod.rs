//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line + TRACER_* env (args.rs)
//!     → profile file (loader.rs, TOML, ~ expanded)
//!     → stack resolution (named datasource or synthesized default)
//!     → validation.rs (semantic checks, all errors collected)
//!     → window.rs (time window resolved against now)
//!     → Datasource + TimeWindow (immutable for the run)
//! ```
//!
//! # Design Decisions
//! - A missing profile file is not an error
//! - The `default` stack can be built from flags alone
//! - Validation separates syntactic (clap, serde) from semantic checks

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod window;

pub use args::Args;
pub use loader::{load_profile, ConfigError, Profile};
pub use schema::{Datasource, Profiles};
pub use validation::{validate, ValidationError};
pub use window::{format_duration, parse_duration, TimeError, TimeWindow};
