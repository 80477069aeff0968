//! Resource identity resolution.
//!
//! # Responsibilities
//! - Split an API path into segments and pick the category segment
//! - Map the HTTP method (and path shape) to an [`Operation`](crate::model::Operation)
//! - Look the category up in an [`IdentityRegistry`]
//!
//! # Design Decisions
//! - Unknown categories resolve to an empty identity, never an error
//! - Only the segment count can make resolution fail

pub mod resolver;

use std::collections::HashMap;

pub use resolver::{resolve, Resolved, UrlDecodeError};

/// Maps a path category (e.g. `processingunits`) to a resource identity.
pub trait IdentityRegistry: Send + Sync {
    /// Returns `None` when the category is unknown.
    fn identity_for(&self, category: &str) -> Option<String>;
}

/// Registry backed by a fixed category table.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    categories: HashMap<String, String>,
}

impl StaticRegistry {
    pub fn new(categories: HashMap<String, String>) -> Self {
        Self { categories }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl IdentityRegistry for StaticRegistry {
    fn identity_for(&self, category: &str) -> Option<String> {
        self.categories.get(category).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_registry_lookup() {
        let registry = StaticRegistry::new(HashMap::from([(
            "processingunits".to_string(),
            "processingunit".to_string(),
        )]));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.identity_for("processingunits").as_deref(),
            Some("processingunit")
        );
        assert!(registry.identity_for("unknown").is_none());
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = StaticRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.identity_for("processingunits").is_none());
    }
}
