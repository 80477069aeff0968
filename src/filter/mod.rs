//! Error record filtering.
//!
//! # Data Flow
//! ```text
//! records
//!     → dedup (keyed by fingerprint, last write wins)
//!     → code_filter (drop codes outside the expression)
//!     → service_url_filter (service OR url match)
//!     → Vec<ErrorRecord>, unordered
//! ```
//!
//! # Design Decisions
//! - The expression is parsed once into a [`FilterSpec`]; a parse error
//!   rejects the whole filter
//! - Each stage is a pure function over owned collections
//! - Service and URL lists are OR-ed, not AND-ed

pub mod codes;

use std::collections::{HashMap, HashSet};

pub use codes::{CodeFilter, FilterParseError};

use crate::model::ErrorRecord;

/// Filters for one invocation.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub codes: CodeFilter,
    pub services: HashSet<String>,
    pub urls: HashSet<String>,
}

impl FilterSpec {
    pub fn parse(
        codes: &str,
        services: &[String],
        urls: &[String],
    ) -> Result<Self, FilterParseError> {
        Ok(Self {
            codes: CodeFilter::parse(codes)?,
            services: services.iter().cloned().collect(),
            urls: urls.iter().cloned().collect(),
        })
    }

    /// Run the full pipeline over `records`.
    pub fn apply(&self, records: Vec<ErrorRecord>) -> Vec<ErrorRecord> {
        let unique = dedup(records);
        let accepted = code_filter(unique, &self.codes);
        service_url_filter(accepted, &self.services, &self.urls)
    }
}

/// Parse the filters and apply them to `records`.
pub fn filter(
    codes: &str,
    services: &[String],
    urls: &[String],
    records: Vec<ErrorRecord>,
) -> Result<Vec<ErrorRecord>, FilterParseError> {
    Ok(FilterSpec::parse(codes, services, urls)?.apply(records))
}

/// Key records by fingerprint. Later duplicates overwrite earlier ones.
pub fn dedup(records: Vec<ErrorRecord>) -> HashMap<u32, ErrorRecord> {
    records
        .into_iter()
        .map(|record| (record.fingerprint(), record))
        .collect()
}

/// Keep the records whose code the filter accepts.
pub fn code_filter(
    records: HashMap<u32, ErrorRecord>,
    codes: &CodeFilter,
) -> HashMap<u32, ErrorRecord> {
    if !codes.is_active() {
        return records;
    }

    records
        .into_iter()
        .filter(|(_, record)| codes.accepts(record.code))
        .collect()
}

/// Keep records matching a service OR a url. No lists means keep all.
pub fn service_url_filter(
    records: HashMap<u32, ErrorRecord>,
    services: &HashSet<String>,
    urls: &HashSet<String>,
) -> Vec<ErrorRecord> {
    if services.is_empty() && urls.is_empty() {
        return records.into_values().collect();
    }

    records
        .into_values()
        .filter(|record| services.contains(&record.service) || urls.contains(&record.url))
        .collect()
}
