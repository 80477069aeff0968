//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the profile and validate it against the flags
//! - Dispatch to trace opening, log mode or error mode
//! - Wire the concrete monitoring client into the pipeline stages

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::config::{load_profile, validate, Args, ConfigError, Datasource, TimeError, TimeWindow};
use crate::correlate::{CorrelationSettings, TraceCorrelator};
use crate::error::TracerError;
use crate::filter::FilterSpec;
use crate::lifecycle::signals::interrupted;
use crate::model::by_count;
use crate::monitoring::{fetch_api_errors, Direction, LogEntry, LogQuery, MonitoringClient};
use crate::output;

/// Delay between two polls in follow mode.
pub const FOLLOW_INTERVAL: Duration = Duration::from_secs(2);

/// Run one invocation, writing results to stdout.
pub async fn run(args: Args) -> Result<(), TracerError> {
    execute(args, &mut io::stdout()).await
}

/// Run one invocation, writing results to `out`.
pub async fn execute<W: Write + Send>(args: Args, out: &mut W) -> Result<(), TracerError> {
    let profile = load_profile(&args)?;
    validate(&args, &profile.datasource).map_err(ConfigError::Validation)?;
    let datasource = &profile.datasource;

    if let Some(trace) = args.traces.open.as_deref() {
        return open_trace(datasource, trace);
    }

    let window = TimeWindow::resolve(
        args.window.from.as_deref(),
        args.window.to.as_deref(),
        args.window.since,
        Utc::now(),
    )?;

    tracing::debug!(
        from = %window.from.to_rfc3339(),
        to = %window.to.to_rfc3339(),
        since = ?window.since,
        "Time window resolved"
    );

    if args.logs.is_active() {
        let client = MonitoringClient::new(datasource)?;
        client.ping().await?;
        return run_logs(&client, &args, &window, out).await;
    }

    let filters = FilterSpec::parse(
        &args.filters.codes,
        &args.filters.services,
        &args.filters.urls,
    )?;

    let client = MonitoringClient::new(datasource)?;
    client.ping().await?;

    let records = fetch_api_errors(&client, &profile.registry, window.since, window.to).await?;
    let fetched = records.len();

    let mut records = filters.apply(records);
    records.sort_by(by_count);

    tracing::info!(
        fetched,
        kept = records.len(),
        "Looking up traces for API errors"
    );

    let settings = CorrelationSettings {
        window,
        limit: args.traces.limit,
        min_duration: args.traces.min_duration,
        namespace: args.traces.namespace.clone(),
        errors_only: args.traces.errors_only,
    };
    let correlator = TraceCorrelator::new(Arc::new(client), settings);
    let records = correlator.correlate(records).await;

    output::write_report(out, &records, args.traces.limit, &datasource.monitoring_url)?;
    Ok(())
}

fn open_trace(datasource: &Datasource, trace: &str) -> Result<(), TracerError> {
    let url = output::explore_url(
        &datasource.monitoring_url,
        &datasource.traces_datasource_name,
        trace,
    )?;

    if let Err(e) = output::open_in_browser(&url) {
        tracing::debug!(error = %e, "Unable to launch a browser");
        eprintln!("Open this URL in your browser: {}", url);
    }
    Ok(())
}

async fn run_logs<W: Write + Send>(
    client: &MonitoringClient,
    args: &Args,
    window: &TimeWindow,
    out: &mut W,
) -> Result<(), TracerError> {
    let show_labels = !args.logs.no_labels;
    let query = LogQuery::selector(&args.filters.services, args.logs.log_filter.as_deref());

    let mut request = LogQuery {
        query,
        start: nanos(window.from)?,
        end: nanos(window.to)?,
        limit: args.logs.lines,
        direction: args.logs.direction,
    };

    let entries = client.query_logs(&request).await?;
    output::write_entries(out, &entries, show_labels)?;
    out.flush()?;

    if !args.logs.follow {
        return Ok(());
    }

    let mut cursor = advance_cursor(request.end, &entries);
    request.direction = Direction::Forward;

    let interrupt = interrupted();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = &mut interrupt => break,
            _ = tokio::time::sleep(FOLLOW_INTERVAL) => {}
        }

        request.start = cursor;
        request.end = nanos(Utc::now())?;
        if request.end <= request.start {
            continue;
        }

        let entries = match client.query_logs(&request).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Unable to poll logs");
                continue;
            }
        };

        output::write_entries(out, &entries, show_labels)?;
        out.flush()?;
        cursor = advance_cursor(request.end, &entries);
    }

    Ok(())
}

/// Start of the next follow poll: just after the newest entry seen, and
/// never before the end of the previous poll.
pub fn advance_cursor(previous_end: i64, entries: &[LogEntry]) -> i64 {
    entries
        .iter()
        .map(|e| e.timestamp_ns.saturating_add(1))
        .max()
        .map_or(previous_end, |next| next.max(previous_end))
}

fn nanos(t: chrono::DateTime<Utc>) -> Result<i64, TimeError> {
    t.timestamp_nanos_opt().ok_or(TimeError::OutOfRange)
}
