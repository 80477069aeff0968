//! Status code expression parsing.
//!
//! Grammar: comma separated parts, each a code (`404`), an inclusive range
//! (`400-422`) or empty. Surrounding whitespace of a part is ignored.

use std::ops::RangeInclusive;
use thiserror::Error;

/// Errors raised by a malformed `--code` expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterParseError {
    #[error("--code failed to parse: unable to convert entry to integer: {0}")]
    InvalidEntry(String),

    #[error("--code failed to parse: unable to convert lower bound to integer: {0:?}")]
    InvalidLowerBound(String),

    #[error("--code failed to parse: unable to convert upper bound to integer: {0:?}")]
    InvalidUpperBound(String),

    #[error("--code failed to parse: bad code range: {0}, must be in the form X-Y")]
    BadRange(String),

    #[error("--code failed to parse: invalid range, lower bound {low} is greater than upper bound {high}")]
    InvertedRange { low: i32, high: i32 },
}

/// Set of accepted status codes, stored as inclusive ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeFilter {
    ranges: Vec<RangeInclusive<i32>>,
}

impl CodeFilter {
    /// Parse a code expression. Any malformed part rejects the whole expression.
    pub fn parse(expr: &str) -> Result<Self, FilterParseError> {
        let mut ranges = Vec::new();

        for part in expr.split(',').map(str::trim) {
            if part.is_empty() {
                continue;
            }

            let bounds: Vec<&str> = part.split('-').collect();
            match bounds.as_slice() {
                [single] => {
                    let code = single
                        .parse::<i32>()
                        .map_err(|_| FilterParseError::InvalidEntry(part.to_string()))?;
                    ranges.push(code..=code);
                }
                [low, high] => {
                    let low_code = low
                        .parse::<i32>()
                        .map_err(|_| FilterParseError::InvalidLowerBound(low.to_string()))?;
                    let high_code = high
                        .parse::<i32>()
                        .map_err(|_| FilterParseError::InvalidUpperBound(high.to_string()))?;
                    if low_code > high_code {
                        return Err(FilterParseError::InvertedRange {
                            low: low_code,
                            high: high_code,
                        });
                    }
                    ranges.push(low_code..=high_code);
                }
                _ => return Err(FilterParseError::BadRange(part.to_string())),
            }
        }

        Ok(Self { ranges })
    }

    /// An inactive filter accepts every code.
    pub fn is_active(&self) -> bool {
        !self.ranges.is_empty()
    }

    pub fn accepts(&self, code: i32) -> bool {
        !self.is_active() || self.ranges.iter().any(|r| r.contains(&code))
    }
}
