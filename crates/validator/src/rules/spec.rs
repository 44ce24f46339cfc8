//! Serializable rule declarations
//!
//! [`RuleSpec`] is the data form of a rule, suitable for catalogs loaded from
//! configuration:
//!
//! ```json
//! { "kind": "range", "min": 0, "max": 130, "message": "{display} is out of range" }
//! ```
//!
//! Specs are compiled into [`Rule`]s during schema resolution, so a bad
//! pattern or inverted bounds fail there and never at validation time.

use serde::{Deserialize, Serialize};

use crate::foundation::SchemaError;

use super::{ConstraintRule, Rule};

/// Declarative rule, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    /// Value must be present.
    Required {
        /// Accept empty and whitespace-only text.
        #[serde(default)]
        allow_empty_strings: bool,
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Text or list must not be empty.
    NotEmpty {
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Number `>= value`.
    Min {
        /// Inclusive bound.
        value: f64,
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Number `<= value`.
    Max {
        /// Inclusive bound.
        value: f64,
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Number in `[min, max]`.
    Range {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// At least `value` chars or elements.
    MinLength {
        /// Inclusive bound.
        value: usize,
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// At most `value` chars or elements.
    MaxLength {
        /// Inclusive bound.
        value: usize,
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Chars or elements in `[min, max]`.
    Length {
        /// Inclusive lower bound.
        min: usize,
        /// Inclusive upper bound.
        max: usize,
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Whole text must match `pattern`.
    Pattern {
        /// Regular expression, implicitly anchored.
        pattern: String,
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Text must look like an email address.
    Email {
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Value must be one of `values`.
    OneOf {
        /// Accepted values.
        values: Vec<String>,
        /// Message template.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl RuleSpec {
    /// `required`
    #[must_use]
    pub fn required() -> Self {
        Self::Required {
            allow_empty_strings: false,
            message: None,
        }
    }

    /// `not_empty`
    #[must_use]
    pub fn not_empty() -> Self {
        Self::NotEmpty { message: None }
    }

    /// `min`
    #[must_use]
    pub fn min(value: f64) -> Self {
        Self::Min {
            value,
            message: None,
        }
    }

    /// `max`
    #[must_use]
    pub fn max(value: f64) -> Self {
        Self::Max {
            value,
            message: None,
        }
    }

    /// `range`
    #[must_use]
    pub fn range(min: f64, max: f64) -> Self {
        Self::Range {
            min,
            max,
            message: None,
        }
    }

    /// `length`
    #[must_use]
    pub fn length(min: usize, max: usize) -> Self {
        Self::Length {
            min,
            max,
            message: None,
        }
    }

    /// `pattern`
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: None,
        }
    }

    /// `email`
    #[must_use]
    pub fn email() -> Self {
        Self::Email { message: None }
    }

    /// Sets the message template.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        *self.message_mut() = Some(text.into());
        self
    }

    /// Returns true for `required`.
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required { .. })
    }

    fn message_mut(&mut self) -> &mut Option<String> {
        match self {
            Self::Required { message, .. }
            | Self::NotEmpty { message }
            | Self::Min { message, .. }
            | Self::Max { message, .. }
            | Self::Range { message, .. }
            | Self::MinLength { message, .. }
            | Self::MaxLength { message, .. }
            | Self::Length { message, .. }
            | Self::Pattern { message, .. }
            | Self::Email { message }
            | Self::OneOf { message, .. } => message,
        }
    }

    /// Compiles the declaration for `member`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidPattern`] for a pattern that does not compile and
    /// [`SchemaError::InvalidBounds`] for inverted or non-finite bounds.
    pub fn compile(&self, member: &str) -> Result<Rule, SchemaError> {
        let (constraint, message) = match self {
            Self::Required {
                allow_empty_strings,
                message,
            } => (
                ConstraintRule::Required {
                    allow_empty_strings: *allow_empty_strings,
                },
                message,
            ),
            Self::NotEmpty { message } => (ConstraintRule::NotEmpty, message),
            Self::Min { value, message } => (ConstraintRule::Min(*value), message),
            Self::Max { value, message } => (ConstraintRule::Max(*value), message),
            Self::Range { min, max, message } => (
                ConstraintRule::Range {
                    min: *min,
                    max: *max,
                },
                message,
            ),
            Self::MinLength { value, message } => (ConstraintRule::MinLength(*value), message),
            Self::MaxLength { value, message } => (ConstraintRule::MaxLength(*value), message),
            Self::Length { min, max, message } => (
                ConstraintRule::Length {
                    min: *min,
                    max: *max,
                },
                message,
            ),
            Self::Pattern { pattern, message } => {
                let rule = Rule::pattern(pattern).map_err(|source| SchemaError::InvalidPattern {
                    member: member.to_owned(),
                    pattern: pattern.clone(),
                    source,
                })?;
                (rule.constraint, message)
            }
            Self::Email { message } => (ConstraintRule::Email, message),
            Self::OneOf { values, message } => (ConstraintRule::OneOf(values.clone()), message),
        };

        constraint.check_config(member)?;
        Ok(Rule {
            constraint,
            message: message.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_tagged_specs() {
        let specs: Vec<RuleSpec> = serde_json::from_value(json!([
            { "kind": "required" },
            { "kind": "range", "min": 0, "max": 130, "message": "{display} is out of range" },
            { "kind": "one_of", "values": ["a", "b"] }
        ]))
        .unwrap();

        assert_eq!(specs[0], RuleSpec::required());
        assert_eq!(
            specs[1],
            RuleSpec::range(0.0, 130.0).with_message("{display} is out of range")
        );
        assert!(specs[0].is_required());
        assert!(!specs[2].is_required());
    }

    #[test]
    fn test_serializes_without_empty_message() {
        let value = serde_json::to_value(RuleSpec::min(1.0)).unwrap();
        assert_eq!(value, json!({ "kind": "min", "value": 1.0 }));
    }

    #[test]
    fn test_compile_rejects_bad_pattern() {
        let err = RuleSpec::pattern("(").compile("zip").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { ref member, .. } if member == "zip"));
    }

    #[test]
    fn test_compile_rejects_inverted_bounds() {
        let err = RuleSpec::length(5, 1).compile("tags").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidBounds { rule: "length", .. }));
    }

    #[test]
    fn test_compile_keeps_message() {
        let rule = RuleSpec::email().with_message("bad email").compile("email").unwrap();
        assert_eq!(rule.kind(), "email");
        assert!(matches!(rule.constraint(), ConstraintRule::Email));
    }
}
