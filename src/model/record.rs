//! The aggregated API error bucket and its fingerprint.

use std::cmp::Ordering;
use std::fmt;

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// Kind of API operation inferred from the HTTP method and path shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Delete,
    Info,
    Patch,
    Retrieve,
    RetrieveMany,
    Update,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Delete => "delete",
            Operation::Info => "info",
            Operation::Patch => "patch",
            Operation::Retrieve => "retrieve",
            Operation::RetrieveMany => "retrieve-many",
            Operation::Update => "update",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One aggregated (code, service, url, method) error bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorRecord {
    /// HTTP status code.
    pub code: i32,
    /// Service label as reported by the metrics backend.
    pub service: String,
    /// Resource identity derived from the URL. May be empty.
    pub identity: String,
    /// Operation derived from method and URL shape.
    pub operation: Option<Operation>,
    pub method: String,
    pub url: String,
    /// Sample count, or trace count once trace filters narrowed the set.
    pub count: u64,
    /// Example trace ids, filled by the correlator.
    pub traces: Vec<String>,
}

impl ErrorRecord {
    /// 32-bit FNV-1a over code, url and method.
    ///
    /// Two records with the same fingerprint are treated as duplicates.
    pub fn fingerprint(&self) -> u32 {
        fnv1a32(format!("{}{}{}", self.code, self.url, self.method).as_bytes())
    }

    /// Operation as rendered in tables and trace tags (empty when unknown).
    pub fn operation_name(&self) -> &'static str {
        self.operation.map(|op| op.as_str()).unwrap_or("")
    }
}

fn fnv1a32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV32_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV32_PRIME)
    })
}

/// Ascending order on count, for `sort_by`.
pub fn by_count(a: &ErrorRecord, b: &ErrorRecord) -> Ordering {
    a.count.cmp(&b.count)
}
