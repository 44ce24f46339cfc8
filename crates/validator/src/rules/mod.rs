//! Constraint rules
//!
//! A [`Rule`] is a single atomic check applied to one value. It is a pure
//! function of the value and a [`RuleContext`]: it either passes, reports a
//! failure message, or fails to execute ([`RuleError`]).
//!
//! Rules come from two places:
//!
//! - [`RuleSpec`]: the serializable authoring form, compiled at resolution time
//! - code: [`Rule::required`], [`Rule::min`], [`Rule::custom`], ...
//!
//! # Null handling
//!
//! Absence is the business of [`ConstraintRule::Required`]. Every other rule
//! passes on [`Value::Null`].
//!
//! # Examples
//!
//! ```rust
//! use tessera_validator::foundation::{Services, Value};
//! use tessera_validator::rules::{Rule, RuleContext};
//!
//! let services = Services::new();
//! let cx = RuleContext::new("age", "Age", "age", &services);
//!
//! let rule = Rule::min(0.0);
//! assert_eq!(rule.evaluate(&Value::Int(-1), &cx).unwrap().as_deref(), Some("must be >= 0"));
//! assert_eq!(rule.evaluate(&Value::Null, &cx).unwrap(), None);
//! ```

mod custom;
mod spec;

pub use custom::{CustomCheck, CustomRule};
pub use spec::RuleSpec;

use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::{RuleError, SchemaError, Services, Value};

// ============================================================================
// RULE CONTEXT
// ============================================================================

/// Ambient information available to a rule while it runs.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Declared member name.
    pub member: &'a str,
    /// Human-facing member label.
    pub display_name: &'a str,
    /// Error path the rule reports under.
    pub path: &'a str,
    /// Host services.
    pub services: &'a Services,
}

impl<'a> RuleContext<'a> {
    /// Creates a rule context.
    #[must_use]
    pub fn new(member: &'a str, display_name: &'a str, path: &'a str, services: &'a Services) -> Self {
        Self {
            member,
            display_name,
            path,
            services,
        }
    }
}

// ============================================================================
// CONSTRAINT RULE
// ============================================================================

/// Resolved constraint, ready to evaluate.
#[derive(Debug, Clone)]
pub enum ConstraintRule {
    /// Value must be present. Blank text counts as absent unless allowed.
    Required {
        /// Accept `""` and whitespace-only text.
        allow_empty_strings: bool,
    },
    /// Text or list must have at least one character / element.
    NotEmpty,
    /// Number must be `>=` the bound.
    Min(f64),
    /// Number must be `<=` the bound.
    Max(f64),
    /// Number must lie in `[min, max]`.
    Range {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// Text chars / list elements `>=` n.
    MinLength(usize),
    /// Text chars / list elements `<=` n.
    MaxLength(usize),
    /// Text chars / list elements in `[min, max]`.
    Length {
        /// Inclusive lower bound.
        min: usize,
        /// Inclusive upper bound.
        max: usize,
    },
    /// Whole text must match the pattern.
    Pattern {
        /// Anchored, compiled pattern.
        regex: Regex,
        /// Pattern as authored.
        source: String,
    },
    /// Text must look like an email address.
    Email,
    /// Value must equal one of the listed values.
    OneOf(Vec<String>),
    /// Host-supplied check.
    Custom(CustomRule),
}

impl ConstraintRule {
    /// Stable rule name used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Required { .. } => "required",
            Self::NotEmpty => "not_empty",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Range { .. } => "range",
            Self::MinLength(_) => "min_length",
            Self::MaxLength(_) => "max_length",
            Self::Length { .. } => "length",
            Self::Pattern { .. } => "pattern",
            Self::Email => "email",
            Self::OneOf(_) => "one_of",
            Self::Custom(custom) => custom.name(),
        }
    }

    /// Returns true for the required check.
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required { .. })
    }

    /// Checks the rule's own parameters.
    pub(crate) fn check_config(&self, member: &str) -> Result<(), SchemaError> {
        let bounds = |min: String, max: String| SchemaError::InvalidBounds {
            member: member.to_owned(),
            rule: self.static_kind(),
            min,
            max,
        };
        match self {
            Self::Min(v) | Self::Max(v) if !v.is_finite() => {
                Err(bounds(v.to_string(), v.to_string()))
            }
            Self::Range { min, max } if !(min.is_finite() && max.is_finite() && min <= max) => {
                Err(bounds(min.to_string(), max.to_string()))
            }
            Self::Length { min, max } if min > max => Err(bounds(min.to_string(), max.to_string())),
            _ => Ok(()),
        }
    }

    fn static_kind(&self) -> &'static str {
        match self {
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Range { .. } => "range",
            Self::Length { .. } => "length",
            _ => "rule",
        }
    }

    fn default_message(&self) -> String {
        match self {
            Self::Required { .. } => "required".to_owned(),
            Self::NotEmpty => "must not be empty".to_owned(),
            Self::Min(min) => format!("must be >= {min}"),
            Self::Max(max) => format!("must be <= {max}"),
            Self::Range { min, max } => format!("must be between {min} and {max}"),
            Self::MinLength(n) => format!("length must be at least {n}"),
            Self::MaxLength(n) => format!("length must be at most {n}"),
            Self::Length { min, max } => format!("length must be between {min} and {max}"),
            Self::Pattern { source, .. } => format!("must match pattern '{source}'"),
            Self::Email => "must be a valid email address".to_owned(),
            Self::OneOf(values) => format!("must be one of: {}", values.join(", ")),
            Self::Custom(custom) => format!("{} check failed", custom.name()),
        }
    }

    /// Returns true if the value satisfies the constraint.
    fn passes(&self, value: &Value) -> Result<bool, RuleError> {
        match self {
            Self::Required { allow_empty_strings } => Ok(match value {
                Value::Null => false,
                Value::Text(s) => *allow_empty_strings || !s.trim().is_empty(),
                _ => true,
            }),
            Self::NotEmpty => self.measure(value).map(|len| len > 0),
            Self::Min(min) => self.number(value).map(|n| n >= *min),
            Self::Max(max) => self.number(value).map(|n| n <= *max),
            Self::Range { min, max } => self.number(value).map(|n| n >= *min && n <= *max),
            Self::MinLength(n) => self.measure(value).map(|len| len >= *n),
            Self::MaxLength(n) => self.measure(value).map(|len| len <= *n),
            Self::Length { min, max } => self.measure(value).map(|len| len >= *min && len <= *max),
            Self::Pattern { regex, .. } => self.text(value).map(|s| regex.is_match(s)),
            Self::Email => self.text(value).map(|text| EMAIL_REGEX.is_match(text)),
            Self::OneOf(values) => {
                let rendered = match value {
                    Value::Text(s) => s.clone(),
                    Value::Int(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => return Err(self.mismatch("text, integer or bool", other)),
                };
                Ok(values.iter().any(|v| *v == rendered))
            }
            // Custom rules report their own message; handled by `Rule::evaluate`.
            Self::Custom(_) => Ok(true),
        }
    }

    fn number(&self, value: &Value) -> Result<f64, RuleError> {
        match value {
            Value::Int(n) => Ok(*n as f64),
            Value::Float(n) => Ok(*n),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.mismatch("number", value)),
            other => Err(self.mismatch("number", other)),
        }
    }

    fn measure(&self, value: &Value) -> Result<usize, RuleError> {
        match value {
            Value::Text(s) => Ok(s.chars().count()),
            Value::List(items) => Ok(items.len()),
            other => Err(self.mismatch("text or list", other)),
        }
    }

    fn text<'v>(&self, value: &'v Value) -> Result<&'v str, RuleError> {
        value.as_text().ok_or_else(|| self.mismatch("text", value))
    }

    fn mismatch(&self, expected: &'static str, actual: &Value) -> RuleError {
        RuleError::TypeMismatch {
            rule: self.kind().to_owned(),
            expected,
            actual: actual.kind(),
        }
    }
}

/// Dot-atom local part, then at least two domain labels of up to 63
/// alphanumerics or inner hyphens.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

// ============================================================================
// RULE
// ============================================================================

/// A constraint plus an optional message template.
///
/// Templates may use `{display}` (display name) and `{name}` (member name).
#[derive(Debug, Clone)]
pub struct Rule {
    constraint: ConstraintRule,
    message: Option<String>,
}

impl Rule {
    /// Wraps a constraint with its default message.
    #[must_use]
    pub fn new(constraint: ConstraintRule) -> Self {
        Self {
            constraint,
            message: None,
        }
    }

    /// Value must be present and, for text, not blank.
    #[must_use]
    pub fn required() -> Self {
        Self::new(ConstraintRule::Required {
            allow_empty_strings: false,
        })
    }

    /// Value must be present; empty text is accepted.
    #[must_use]
    pub fn required_allow_empty() -> Self {
        Self::new(ConstraintRule::Required {
            allow_empty_strings: true,
        })
    }

    /// Text or list must not be empty.
    #[must_use]
    pub fn not_empty() -> Self {
        Self::new(ConstraintRule::NotEmpty)
    }

    /// Number `>= min`.
    #[must_use]
    pub fn min(min: f64) -> Self {
        Self::new(ConstraintRule::Min(min))
    }

    /// Number `<= max`.
    #[must_use]
    pub fn max(max: f64) -> Self {
        Self::new(ConstraintRule::Max(max))
    }

    /// Number in `[min, max]`.
    #[must_use]
    pub fn range(min: f64, max: f64) -> Self {
        Self::new(ConstraintRule::Range { min, max })
    }

    /// At least `n` chars or elements.
    #[must_use]
    pub fn min_length(n: usize) -> Self {
        Self::new(ConstraintRule::MinLength(n))
    }

    /// At most `n` chars or elements.
    #[must_use]
    pub fn max_length(n: usize) -> Self {
        Self::new(ConstraintRule::MaxLength(n))
    }

    /// Between `min` and `max` chars or elements.
    #[must_use]
    pub fn length(min: usize, max: usize) -> Self {
        Self::new(ConstraintRule::Length { min, max })
    }

    /// Whole text must match `pattern`.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self::new(ConstraintRule::Pattern {
            regex,
            source: pattern.to_owned(),
        }))
    }

    /// Text must look like an email address.
    #[must_use]
    pub fn email() -> Self {
        Self::new(ConstraintRule::Email)
    }

    /// Value must be one of `values`.
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ConstraintRule::OneOf(values.into_iter().map(Into::into).collect()))
    }

    /// Host-supplied check.
    pub fn custom<F>(name: impl AsRef<str>, check: F) -> Self
    where
        F: Fn(&Value, &RuleContext<'_>) -> Result<Option<String>, RuleError> + Send + Sync + 'static,
    {
        Self::new(ConstraintRule::Custom(CustomRule::new(name, check)))
    }

    /// Overrides the failure message.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the constraint.
    #[must_use]
    pub fn constraint(&self) -> &ConstraintRule {
        &self.constraint
    }

    /// Rule name.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.constraint.kind()
    }

    /// Returns true for the required check.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.constraint.is_required()
    }

    /// Evaluates the rule. `Ok(Some(message))` means the value failed.
    pub fn evaluate(&self, value: &Value, cx: &RuleContext<'_>) -> Result<Option<String>, RuleError> {
        if value.is_null() && !self.constraint.is_required() {
            return Ok(None);
        }

        if let ConstraintRule::Custom(custom) = &self.constraint {
            let failed = custom.run(value, cx)?;
            return Ok(failed.map(|msg| self.render(Some(msg), cx)));
        }

        if self.constraint.passes(value)? {
            Ok(None)
        } else {
            Ok(Some(self.render(None, cx)))
        }
    }

    fn render(&self, reported: Option<String>, cx: &RuleContext<'_>) -> String {
        match &self.message {
            Some(template) => template
                .replace("{display}", cx.display_name)
                .replace("{name}", cx.member),
            None => reported.unwrap_or_else(|| self.constraint.default_message()),
        }
    }
}

impl From<ConstraintRule> for Rule {
    fn from(constraint: ConstraintRule) -> Self {
        Self::new(constraint)
    }
}
