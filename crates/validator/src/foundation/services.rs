//! Ambient services for custom rules and self-validation hooks
//!
//! Some checks need collaborators that are not part of the value being
//! validated: a clock, a lookup table, a uniqueness oracle. The host registers
//! them by key before validation starts; custom rules and hooks fetch them by
//! key and concrete type.
//!
//! # Examples
//!
//! ```rust
//! use tessera_validator::foundation::Services;
//!
//! let services = Services::builder()
//!     .with("reserved_names", vec!["admin".to_string()])
//!     .build();
//!
//! let reserved: Option<&Vec<String>> = services.get("reserved_names");
//! assert_eq!(reserved.map(Vec::len), Some(1));
//! ```

use std::any::Any;
use std::collections::HashMap;

use super::error::RuleError;

// ============================================================================
// SERVICES
// ============================================================================

/// Type-erased, string-keyed service table.
///
/// Shared read-only across a validation call behind an `Arc`.
#[derive(Debug, Default)]
pub struct Services {
    data: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Services {
    /// Creates an empty service table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> ServicesBuilder {
        ServicesBuilder::new()
    }

    /// Registers a service under `key`, replacing any previous one.
    pub fn insert<T: Send + Sync + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), Box::new(value));
    }

    /// Gets a service by key. Returns `None` if absent or of another type.
    #[must_use]
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.data.get(key).and_then(|value| value.downcast_ref::<T>())
    }

    /// Gets a service or reports it as missing.
    ///
    /// Intended for custom rules: the error is turned into a failure message
    /// at the current path and logged.
    pub fn require<T: 'static>(&self, key: &str) -> Result<&T, RuleError> {
        self.get(key).ok_or_else(|| RuleError::MissingService {
            key: key.to_owned(),
        })
    }

    /// Checks if a key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`Services`].
#[derive(Debug, Default)]
pub struct ServicesBuilder {
    services: Services,
}

impl ServicesBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service.
    #[must_use = "builder methods must be chained or built"]
    pub fn with<T: Send + Sync + 'static>(mut self, key: impl Into<String>, value: T) -> Self {
        self.services.insert(key, value);
        self
    }

    /// Builds the service table.
    #[must_use]
    pub fn build(self) -> Services {
        self.services
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_checks_type() {
        let services = Services::builder().with("limit", 10_usize).build();

        assert_eq!(services.get::<usize>("limit"), Some(&10));
        assert_eq!(services.get::<u32>("limit"), None);
        assert!(services.contains("limit"));
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn test_require_reports_missing_key() {
        let services = Services::new();
        let err = services.require::<String>("clock").unwrap_err();
        assert_eq!(
            err,
            RuleError::MissingService {
                key: "clock".into()
            }
        );
        assert!(services.is_empty());
    }
}
