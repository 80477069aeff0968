//! tracer: correlate API errors with example traces.
//!
//! Queries Prometheus (through a Grafana datasource proxy) for API error
//! counts, filters them, then looks up matching Jaeger traces for every
//! remaining error. Can also print or follow Loki logs.

// Domain
pub mod filter;
pub mod identity;
pub mod model;

// Backends and pipeline
pub mod correlate;
pub mod monitoring;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod output;

pub use config::Args;
pub use error::TracerError;
pub use lifecycle::{execute, run};
pub use model::ErrorRecord;
