//! Error map and error types
//!
//! Three kinds of failure are kept apart:
//!
//! - **Validation failures** are data. They are recorded in an [`ErrorMap`]
//!   keyed by error path and never surface as `Err`.
//! - **Configuration errors** ([`SchemaError`]) are raised while resolving
//!   schemas and indicate an authoring bug.
//! - **Faults** ([`ValidationFault`]) abort a whole validation call, e.g. when
//!   the depth limit is hit on a cyclic instance graph.
//!
//! [`RuleError`] sits in between: a rule that fails to *execute* is converted
//! into a failure message at the current path and logged.

use indexmap::IndexMap;
use serde::Serialize;

// ============================================================================
// ERROR MAP
// ============================================================================

/// Mapping from error path to the ordered, de-duplicated messages at that path.
///
/// Serializes as `{ "path": ["message", ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap {
    entries: IndexMap<String, Vec<String>>,
    #[serde(skip)]
    messages: usize,
    #[serde(skip)]
    truncated: bool,
}

impl ErrorMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` at `path` unless the identical message is already
    /// present there. Returns true if the message was added.
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) -> bool {
        let message = message.into();
        let messages = self.entries.entry(path.into()).or_default();
        if messages.iter().any(|m| *m == message) {
            return false;
        }
        messages.push(message);
        self.messages += 1;
        true
    }

    /// Returns the messages recorded at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Returns true if any message is recorded at `path`.
    #[must_use]
    pub fn contains_key(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of distinct paths with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of messages across all paths.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages
    }

    /// Iterates `(path, messages)` in first-recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Iterates the paths in first-recorded order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns true if recording stopped because the error cap was reached.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub(crate) fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    /// Consumes the map and returns the underlying entries.
    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, Vec<String>> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a ErrorMap {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// SCHEMA (CONFIGURATION) ERRORS
// ============================================================================

/// Authoring errors detected while resolving a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A pattern rule does not compile.
    #[error("invalid pattern '{pattern}' on member '{member}': {source}")]
    InvalidPattern {
        /// Member carrying the rule.
        member: String,
        /// The offending pattern.
        pattern: String,
        /// Compilation failure.
        #[source]
        source: regex::Error,
    },

    /// A bounded rule has `min > max` or a non-finite bound.
    #[error("invalid bounds for rule '{rule}' on member '{member}': min {min} > max {max}")]
    InvalidBounds {
        /// Member carrying the rule.
        member: String,
        /// Rule kind.
        rule: &'static str,
        /// Lower bound as declared.
        min: String,
        /// Upper bound as declared.
        max: String,
    },

    /// The member is flagged required but has no required check.
    #[error("member '{member}' is marked required but declares no required rule")]
    RequiredWithoutCheck {
        /// Offending member.
        member: String,
    },

    /// More than one required rule was declared on a member.
    #[error("member '{member}' declares more than one required rule")]
    DuplicateRequired {
        /// Offending member.
        member: String,
    },

    /// A host resolver failed to produce a schema.
    #[error("resolver '{resolver}' failed for type '{type_name}': {message}")]
    Resolver {
        /// Name of the failing resolver.
        resolver: String,
        /// Type being resolved.
        type_name: String,
        /// Failure description.
        message: String,
    },
}

// ============================================================================
// FAULTS
// ============================================================================

/// Signals that abort a top-level validation call.
///
/// A fault is never folded into the error map: a partial map would be
/// indistinguishable from a clean one.
#[derive(Debug, thiserror::Error)]
pub enum ValidationFault {
    /// The traversal reached the configured depth limit.
    #[error(
        "validation exceeded the maximum configured depth '{max_depth}' when validating member \
         '{member}' on type '{type_name}' at '{path}'. This may indicate a very deep or \
         infinitely recursive object graph; raise `max_depth` or exclude the type from validation"
    )]
    MaxDepthExceeded {
        /// Configured limit.
        max_depth: usize,
        /// Member whose nested content would have exceeded the limit.
        member: String,
        /// Type owning that member.
        type_name: String,
        /// Error path of the member.
        path: String,
    },

    /// The caller cancelled the validation.
    #[error("validation cancelled at '{path}'")]
    Cancelled {
        /// Path reached when cancellation was observed.
        path: String,
    },

    /// Lazy resolution of a nested or subtype schema failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ValidationFault {
    /// Returns true for the depth-overflow fault.
    #[must_use]
    pub fn is_max_depth(&self) -> bool {
        matches!(self, Self::MaxDepthExceeded { .. })
    }

    /// Returns true if the call was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

// ============================================================================
// RULE EXECUTION ERRORS
// ============================================================================

/// A rule could not be executed against a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// An ambient service the rule depends on is not registered.
    #[error("required service '{key}' is not registered")]
    MissingService {
        /// Service key.
        key: String,
    },

    /// The rule does not apply to the value's kind.
    #[error("rule '{rule}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// Rule kind.
        rule: String,
        /// Expected value kind.
        expected: &'static str,
        /// Actual value kind.
        actual: &'static str,
    },

    /// Custom rule failure.
    #[error("rule '{rule}' failed: {reason}")]
    Failed {
        /// Rule name.
        rule: String,
        /// Failure description.
        reason: String,
    },
}

impl RuleError {
    /// Creates a custom rule failure.
    pub fn failed(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_map_merges_identical_messages() {
        let mut map = ErrorMap::new();
        assert!(map.add("name", "required"));
        assert!(!map.add("name", "required"));
        assert!(map.add("name", "too short"));

        assert_eq!(map.len(), 1);
        assert_eq!(map.message_count(), 2);
        assert_eq!(
            map.get("name"),
            Some(&["required".to_string(), "too short".to_string()][..])
        );
    }

    #[test]
    fn test_message_count_tracks_adds_across_paths() {
        let mut map = ErrorMap::new();
        assert_eq!(map.message_count(), 0);

        for (path, message) in [("a", "x"), ("b", "x"), ("a", "y"), ("a", "x"), ("c[0]", "z")] {
            map.add(path, message);
        }
        assert_eq!(map.message_count(), 4);
        assert_eq!(map.message_count(), map.iter().map(|(_, m)| m.len()).sum::<usize>());

        let copy = map.clone();
        assert_eq!(copy.message_count(), 4);
    }

    #[test]
    fn test_error_map_preserves_path_order() {
        let mut map = ErrorMap::new();
        map.add("b", "x");
        map.add("a", "y");
        map.add("b", "z");

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_error_map_serializes_as_plain_mapping() {
        let mut map = ErrorMap::new();
        map.add("tags[1]", "must not be empty");
        map.mark_truncated();

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({ "tags[1]": ["must not be empty"] }));
    }

    #[test]
    fn test_fault_display_names_the_limit() {
        let fault = ValidationFault::MaxDepthExceeded {
            max_depth: 4,
            member: "next".into(),
            type_name: "Node".into(),
            path: "next.next".into(),
        };
        let text = fault.to_string();
        assert!(text.contains("'4'"));
        assert!(text.contains("'next' on type 'Node'"));
        assert!(fault.is_max_depth());
        assert!(!fault.is_cancelled());
    }
}
