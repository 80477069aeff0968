//! Time window and duration handling.
//!
//! # Responsibilities
//! - Parse `--from` / `--to` as RFC 3339 timestamps
//! - Parse `--since` / `--slower-than` in Go duration syntax (`1h30m`, `2s`)
//! - Resolve the effective `[from, to)` window and its span
//! - Format durations back for the tracing backend

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

/// Errors raised while resolving the query window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("unable to parse from time: {0} is not a valid RFC 3339 time")]
    InvalidFrom(String),

    #[error("unable to parse to time: {0} is not a valid RFC 3339 time")]
    InvalidTo(String),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("from time {from} is after to time {to}")]
    Inverted { from: String, to: String },

    #[error("time out of range")]
    OutOfRange,
}

/// The window shared by metric aggregation and trace lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Span of the window, used as the metrics lookback.
    pub since: Duration,
}

impl TimeWindow {
    /// Resolve the window from optional bounds.
    ///
    /// `to` defaults to `now` rounded to the second. When `from` is given the
    /// span is `to - from`, otherwise `from` is `to - since`.
    pub fn resolve(
        from: Option<&str>,
        to: Option<&str>,
        since: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, TimeError> {
        let from = from
            .map(|raw| parse_rfc3339(raw).ok_or_else(|| TimeError::InvalidFrom(raw.to_string())))
            .transpose()?;
        let to = match to {
            Some(raw) => parse_rfc3339(raw).ok_or_else(|| TimeError::InvalidTo(raw.to_string()))?,
            None => round_to_second(now)?,
        };

        match from {
            Some(from) => {
                let since = (to - from).to_std().map_err(|_| TimeError::Inverted {
                    from: from.to_rfc3339(),
                    to: to.to_rfc3339(),
                })?;
                Ok(Self { from, to, since })
            }
            None => {
                let span = TimeDelta::from_std(since).map_err(|_| TimeError::OutOfRange)?;
                let from = to.checked_sub_signed(span).ok_or(TimeError::OutOfRange)?;
                Ok(Self { from, to, since })
            }
        }
    }

    pub fn start_micros(&self) -> i64 {
        self.from.timestamp_micros()
    }

    pub fn end_micros(&self) -> i64 {
        self.to.timestamp_micros()
    }
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn round_to_second(t: DateTime<Utc>) -> Result<DateTime<Utc>, TimeError> {
    let carry = i64::from(t.timestamp_subsec_nanos() >= 500_000_000);
    DateTime::from_timestamp(t.timestamp() + carry, 0).ok_or(TimeError::OutOfRange)
}

/// Parse a Go style duration such as `1h`, `1h30m`, `1.5s` or `250ms`.
pub fn parse_duration(input: &str) -> Result<Duration, TimeError> {
    let invalid = || TimeError::InvalidDuration(input.to_string());
    let raw = input.trim();
    if raw == "0" {
        return Ok(Duration::ZERO);
    }
    if raw.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos: f64 = 0.0;
    let mut rest = raw;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let value: f64 = number.parse().map_err(|_| invalid())?;
        let nanos_per_unit: f64 = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };
        total_nanos += value * nanos_per_unit;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Format a duration in the largest unit that represents it exactly.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    match nanos {
        0 => "0s".to_string(),
        n if n % 1_000_000_000 == 0 => format!("{}s", n / 1_000_000_000),
        n if n % 1_000_000 == 0 => format!("{}ms", n / 1_000_000),
        n if n % 1_000 == 0 => format!("{}us", n / 1_000),
        n => format!("{}ns", n),
    }
}
