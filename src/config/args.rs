//! Command line flags.
//!
//! Every flag can also be set through a `TRACER_` prefixed environment
//! variable (`--monitoring-url` ↔ `TRACER_MONITORING_URL`).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser};

use crate::config::window::parse_duration;
use crate::monitoring::logs::Direction;
use crate::observability::logging::{LogFormat, LogLevel};

const EXAMPLES: &str = "\
Examples:

> Display all queries with traces from the last 1h

  tracer --since 1h

> Display all queries for a service from the last 1h

  tracer --since 1h --service squall

> Display all queries for a service in a given namespace from the last 1h

  tracer --since 1h --service squall --namespace /foo/bar

> Display all queries for a service in a given namespace that took more than 2s from the last 1h

  tracer --since 1h --service squall --namespace /foo/bar --slower-than 2s

> Display all requests that returned with an error for the past hour

  tracer --since 1h --errors-only

> Display all requests that returned a code 200 or 400-422 in the past hour

  tracer --since 1h --code 200,400-422

> Display all requests made to /flowreports

  tracer --since 1h --url /flowreports

> Display all 400-403 requests on services squall and cid, or on /issue, between two dates

  tracer --code 400-403 --service squall --service cid --url /issue \\
    --from 2020-10-21T17:56:17Z --to 2020-10-22T17:56:17Z

> Display logs for 2 services between two dates

  tracer --log --service squall --service cid \\
    --from 2020-10-21T17:56:17Z --to 2020-10-22T17:56:17Z

> Open a trace in the browser

  tracer --stack prod --open 4bf92f3577b34da6a3ce929d0e0e4736

Some queries do not provide traces (reports for instance).";

/// Correlate API errors with example traces from the observability stack.
#[derive(Debug, Clone, Parser)]
#[command(name = "tracer", version, about, after_long_help = EXAMPLES)]
pub struct Args {
    #[command(flatten)]
    pub monitoring: MonitoringArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,

    #[command(flatten)]
    pub window: WindowArgs,

    #[command(flatten)]
    pub traces: TraceArgs,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub logs: LogArgs,

    /// Profile file to read stacks from.
    #[arg(long, env = "TRACER_PROFILE_FILE", default_value = "~/.tracer/default.toml")]
    pub profile_file: PathBuf,

    /// Stack name to use from the profile file.
    #[arg(long, env = "TRACER_STACK", default_value = "default")]
    pub stack: String,
}

/// Grafana endpoint and client TLS material.
#[derive(Debug, Clone, Default, ClapArgs)]
#[command(next_help_heading = "Monitoring")]
pub struct MonitoringArgs {
    /// The monitoring (Grafana) url to use.
    #[arg(long, env = "TRACER_MONITORING_URL")]
    pub monitoring_url: Option<String>,

    /// Path to the monitoring CA certificate.
    #[arg(long, env = "TRACER_MONITORING_CA_PATH")]
    pub monitoring_ca_path: Option<PathBuf>,

    /// Path to the monitoring client certificate.
    #[arg(long = "monitoring-cert", env = "TRACER_MONITORING_CERT")]
    pub monitoring_cert_path: Option<PathBuf>,

    /// Path to the monitoring client certificate key (unencrypted PEM).
    #[arg(long = "monitoring-cert-key", env = "TRACER_MONITORING_CERT_KEY")]
    pub monitoring_cert_key_path: Option<PathBuf>,
}

#[derive(Debug, Clone, ClapArgs)]
#[command(next_help_heading = "Logging")]
pub struct LoggingArgs {
    /// Log format.
    #[arg(long, env = "TRACER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Console)]
    pub log_format: LogFormat,

    /// Log level.
    #[arg(long, env = "TRACER_LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, ClapArgs)]
#[command(next_help_heading = "Time window")]
pub struct WindowArgs {
    /// Start of the window (RFC 3339).
    #[arg(long, env = "TRACER_FROM")]
    pub from: Option<String>,

    /// End of the window (RFC 3339), defaults to now.
    #[arg(long, env = "TRACER_TO")]
    pub to: Option<String>,

    /// Window span ending at --to, ignored when --from is set.
    #[arg(long, env = "TRACER_SINCE", value_parser = parse_duration, default_value = "1h")]
    pub since: Duration,
}

#[derive(Debug, Clone, ClapArgs)]
#[command(next_help_heading = "Traces")]
pub struct TraceArgs {
    /// Look for traces matching that namespace.
    #[arg(long, env = "TRACER_NAMESPACE")]
    pub namespace: Option<String>,

    /// Look only for traces in error.
    #[arg(long, env = "TRACER_ERRORS_ONLY")]
    pub errors_only: bool,

    /// Look for traces slower than the provided duration.
    #[arg(long = "slower-than", env = "TRACER_SLOWER_THAN", value_parser = parse_duration, default_value = "0")]
    pub min_duration: Duration,

    /// The number of traces to display per error.
    #[arg(long, env = "TRACER_LIMIT", default_value_t = 1)]
    pub limit: u32,

    /// Open the given trace id in the browser.
    #[arg(long, env = "TRACER_OPEN")]
    pub open: Option<String>,
}

#[derive(Debug, Clone, Default, ClapArgs)]
#[command(next_help_heading = "Filters")]
pub struct FilterArgs {
    /// The codes to keep, e.g. 200-300,400-422,500.
    #[arg(long = "code", env = "TRACER_CODE", default_value = "")]
    pub codes: String,

    /// The service to keep (repeatable).
    #[arg(long = "service", env = "TRACER_SERVICE", value_delimiter = ',')]
    pub services: Vec<String>,

    /// The url to keep (repeatable).
    #[arg(long = "url", env = "TRACER_URL", value_delimiter = ',')]
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, ClapArgs)]
#[command(next_help_heading = "Logs")]
pub struct LogArgs {
    /// Enable log mode to get logs from services.
    #[arg(long = "log", env = "TRACER_LOG")]
    pub enabled: bool,

    /// LogQL filter appended to the service selector, or the full query
    /// when no --service is given.
    #[arg(long, env = "TRACER_LOG_FILTER")]
    pub log_filter: Option<String>,

    /// Number of lines to print.
    #[arg(long, env = "TRACER_LINES", default_value_t = 10)]
    pub lines: u32,

    /// Follow the log stream in almost real time.
    #[arg(long, env = "TRACER_FOLLOW")]
    pub follow: bool,

    /// Do not display labels with logs.
    #[arg(long, env = "TRACER_NO_LABELS")]
    pub no_labels: bool,

    /// Direction of the logs.
    #[arg(long, env = "TRACER_DIRECTION", value_enum, default_value_t = Direction::Forward)]
    pub direction: Direction,
}

impl LogArgs {
    /// Log mode is on with `--log` or any `--log-filter`.
    pub fn is_active(&self) -> bool {
        self.enabled || self.log_filter.as_deref().is_some_and(|f| !f.is_empty())
    }
}
