//! tracer
//!
//! ```text
//!   flags + profile ──▶ config ──▶ monitoring client ──▶ api/health
//!                                        │
//!             ┌──────────────────────────┴───────────────────────┐
//!             ▼                                                  ▼
//!   Prometheus error queries                            Loki range query
//!             │                                                  │
//!   identity + filter + sort                              print / follow
//!             │
//!   one Jaeger lookup per record (tokio tasks)
//!             │
//!           report
//! ```

use std::process::ExitCode;

use clap::Parser;

use tracer::observability::init_logging;
use tracer::Args;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.logging.log_level, args.logging.log_format);

    match tracer::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "tracer failed");
            ExitCode::FAILURE
        }
    }
}
