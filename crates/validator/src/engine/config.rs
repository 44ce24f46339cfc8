//! Configuration types for validation

use serde::{Deserialize, Serialize};

use crate::foundation::KeyNaming;

/// Default traversal depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// How list elements count toward the depth limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthPolicy {
    /// Every descent counts: into an object, whether a member or a list
    /// element, and into each inner list of a list of lists.
    #[default]
    EveryDescent,
    /// Only object descents count; inner lists of a list of lists reuse
    /// their parent's depth.
    ObjectsOnly,
}

/// Main configuration for the validator.
///
/// ```rust
/// use tessera_validator::engine::{DepthPolicy, ValidatorOptions};
///
/// let options: ValidatorOptions =
///     serde_json::from_str(r#"{ "max_depth": 8, "key_naming": "camel_case" }"#).unwrap();
/// assert_eq!(options.max_depth, 8);
/// assert_eq!(options.depth_policy, DepthPolicy::EveryDescent);
/// assert!(options.validate_self_after_member_errors);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Maximum traversal depth before the call faults.
    pub max_depth: usize,
    /// Stop recording (and traversing) after this many messages.
    pub max_errors: Option<usize>,
    /// Depth accounting for nested lists.
    pub depth_policy: DepthPolicy,
    /// Naming convention for member segments of error keys.
    pub key_naming: KeyNaming,
    /// Run self-validation hooks even when the object's members failed.
    pub validate_self_after_member_errors: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_errors: None,
            depth_policy: DepthPolicy::default(),
            key_naming: KeyNaming::default(),
            validate_self_after_member_errors: true,
        }
    }
}

impl ValidatorOptions {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tighter limits for untrusted input.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_depth: 16,
            max_errors: Some(200),
            ..Self::default()
        }
    }

    /// Sets the depth limit.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Caps the number of recorded messages.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }

    /// Sets the depth policy.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_depth_policy(mut self, depth_policy: DepthPolicy) -> Self {
        self.depth_policy = depth_policy;
        self
    }

    /// Sets the key naming convention.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_key_naming(mut self, key_naming: KeyNaming) -> Self {
        self.key_naming = key_naming;
        self
    }

    /// Skips self-validation hooks on objects whose members already failed.
    #[must_use = "builder methods must be chained or built"]
    pub fn skip_self_after_member_errors(mut self) -> Self {
        self.validate_self_after_member_errors = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ValidatorOptions::default();
        assert_eq!(options.max_depth, 32);
        assert_eq!(options.max_errors, None);
        assert!(options.key_naming.is_identity());
    }

    #[test]
    fn test_strict_preset() {
        let options = ValidatorOptions::strict();
        assert_eq!(options.max_depth, 16);
        assert_eq!(options.max_errors, Some(200));
    }

    #[test]
    fn test_deserializes_partial_json() {
        let options: ValidatorOptions =
            serde_json::from_str(r#"{ "depth_policy": "objects_only", "max_errors": 5 }"#).unwrap();
        assert_eq!(options.depth_policy, DepthPolicy::ObjectsOnly);
        assert_eq!(options.max_errors, Some(5));
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_round_trips_through_json() {
        let options = ValidatorOptions::strict().with_key_naming(KeyNaming::SnakeCase);
        let json = serde_json::to_string(&options).unwrap();
        let back: ValidatorOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_depth, 16);
        assert_eq!(back.key_naming.apply("ZipCode"), "zip_code");
    }
}
