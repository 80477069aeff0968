//! Path-segment convention for identities and operations.
//!
//! ```text
//! /<category>                      → identity(category), GET = retrieve-many
//! /<category>/<id>                 → identity(category), GET = retrieve
//! /<parent>/<id>/<category>        → identity(category), GET = retrieve-many
//! ```

use thiserror::Error;

use crate::identity::IdentityRegistry;
use crate::model::Operation;

/// Errors raised while decoding an API path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlDecodeError {
    #[error("unable to decode url {url}: expected 1 to 3 path segments, got {segments}")]
    SegmentCount { url: String, segments: usize },
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    /// Empty when the registry does not know the category.
    pub identity: String,
    pub operation: Option<Operation>,
}

/// Resolve the identity and operation targeted by `method url`.
pub fn resolve(
    url: &str,
    method: &str,
    registry: &dyn IdentityRegistry,
) -> Result<Resolved, UrlDecodeError> {
    let segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();

    let category = match segments.len() {
        1 | 2 => segments[0],
        3 => segments[2],
        n => {
            return Err(UrlDecodeError::SegmentCount {
                url: url.to_string(),
                segments: n,
            })
        }
    };

    let identity = registry.identity_for(category).unwrap_or_default();
    if identity.is_empty() {
        tracing::trace!(category, "Unknown identity category");
    }

    let operation = match method {
        "DELETE" => Some(Operation::Delete),
        "GET" if segments.len() == 2 => Some(Operation::Retrieve),
        "GET" => Some(Operation::RetrieveMany),
        "HEAD" => Some(Operation::Info),
        "PATCH" => Some(Operation::Patch),
        "POST" => Some(Operation::Create),
        "PUT" => Some(Operation::Update),
        _ => None,
    };

    Ok(Resolved {
        identity,
        operation,
    })
}
