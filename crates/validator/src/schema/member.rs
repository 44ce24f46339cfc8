//! Member descriptors
//!
//! A [`MemberDescriptor`] is the resolved description of one validatable
//! property or parameter. It is immutable once built and shared through the
//! schema cache.

use std::fmt;

use crate::foundation::{SchemaError, TypeName};
use crate::rules::Rule;

// ============================================================================
// DECLARED TYPE
// ============================================================================

/// Declared type of a member, as written by the author.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    /// `bool`
    Bool,
    /// Integer.
    Int,
    /// Floating point.
    Float,
    /// Text. Never enumerable.
    Text,
    /// Named (user, library or framework) type.
    Named(TypeName),
    /// Collection of elements.
    List(Box<DeclaredType>),
    /// Value that may be absent.
    Optional(Box<DeclaredType>),
}

impl DeclaredType {
    /// Shorthand for [`DeclaredType::Named`].
    pub fn named(name: impl Into<TypeName>) -> Self {
        Self::Named(name.into())
    }

    /// Shorthand for a list of `element`.
    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    /// Shorthand for an optional `inner`.
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Returns true if the value may be absent.
    ///
    /// Named types, lists and text are references and therefore nullable;
    /// `bool`, `int` and `float` are nullable only when wrapped in
    /// [`DeclaredType::Optional`].
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Named(_) | Self::List(_) | Self::Text)
    }

    /// Returns true if the value is validated element by element.
    #[must_use]
    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::Optional(inner) => inner.is_enumerable(),
            _ => false,
        }
    }

    /// Type of the elements of an enumerable member.
    #[must_use]
    pub fn element_type(&self) -> Option<&Self> {
        match self {
            Self::List(element) => Some(element),
            Self::Optional(inner) => inner.element_type(),
            _ => None,
        }
    }

    /// Named type whose schema governs this member: the element type for
    /// enumerables, the unwrapped type otherwise.
    #[must_use]
    pub fn named_target(&self) -> Option<&TypeName> {
        match self {
            Self::Named(name) => Some(name),
            Self::List(element) | Self::Optional(element) => element.named_target(),
            _ => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Text => f.write_str("text"),
            Self::Named(name) => write!(f, "{name}"),
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Optional(inner) => write!(f, "{inner}?"),
        }
    }
}

// ============================================================================
// MEMBER DESCRIPTOR
// ============================================================================

/// Resolved description of one validatable member.
///
/// When `is_required` is set, the required rule is `rules[0]`.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    name: String,
    display_name: String,
    declared: DeclaredType,
    is_enumerable: bool,
    is_nullable: bool,
    is_required: bool,
    nested_type: Option<TypeName>,
    rules: Vec<Rule>,
    element_rules: Vec<Rule>,
}

impl MemberDescriptor {
    /// Starts building a descriptor.
    pub fn builder(name: impl Into<String>, declared: DeclaredType) -> MemberDescriptorBuilder {
        MemberDescriptorBuilder::new(name, declared)
    }

    /// Declared identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-facing label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Declared type.
    #[must_use]
    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared
    }

    /// Validated element by element.
    #[must_use]
    pub fn is_enumerable(&self) -> bool {
        self.is_enumerable
    }

    /// Allowed to be absent.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.is_nullable
    }

    /// Carries a required rule.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Returns true if recursion continues into a resolved schema.
    #[must_use]
    pub fn has_nested_schema(&self) -> bool {
        self.nested_type.is_some()
    }

    /// Type whose schema the member (or its elements) recurse into.
    #[must_use]
    pub fn nested_type(&self) -> Option<&TypeName> {
        self.nested_type.as_ref()
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules applied to each element of an enumerable member.
    #[must_use]
    pub fn element_rules(&self) -> &[Rule] {
        &self.element_rules
    }

    /// Returns true if the member can contribute errors.
    #[must_use]
    pub fn is_validatable(&self) -> bool {
        !self.rules.is_empty() || !self.element_rules.is_empty() || self.has_nested_schema()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`MemberDescriptor`].
#[derive(Debug)]
pub struct MemberDescriptorBuilder {
    name: String,
    display_name: Option<String>,
    declared: DeclaredType,
    required_flag: bool,
    nested_type: Option<TypeName>,
    rules: Vec<Rule>,
    element_rules: Vec<Rule>,
}

impl MemberDescriptorBuilder {
    fn new(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            declared,
            required_flag: false,
            nested_type: None,
            rules: Vec::new(),
            element_rules: Vec::new(),
        }
    }

    /// Sets the display name (defaults to the member name).
    #[must_use = "builder methods must be chained or built"]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Marks the member required. Requires a required rule among `rules`.
    #[must_use = "builder methods must be chained or built"]
    pub fn required(mut self) -> Self {
        self.required_flag = true;
        self
    }

    /// Appends a rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends several rules.
    #[must_use = "builder methods must be chained or built"]
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Appends a per-element rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn element_rule(mut self, rule: Rule) -> Self {
        self.element_rules.push(rule);
        self
    }

    /// Declares that the member's (element) type has a resolved schema.
    #[must_use = "builder methods must be chained or built"]
    pub fn nested(mut self, type_name: impl Into<TypeName>) -> Self {
        self.nested_type = Some(type_name.into());
        self
    }

    /// Sets or clears the nested schema type.
    #[must_use = "builder methods must be chained or built"]
    pub fn nested_opt(mut self, type_name: Option<TypeName>) -> Self {
        self.nested_type = type_name;
        self
    }

    /// Builds the descriptor.
    ///
    /// The required rule is moved in front of the others.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::DuplicateRequired`] for more than one required rule
    /// - [`SchemaError::RequiredWithoutCheck`] if [`required`](Self::required)
    ///   was called without a required rule
    /// - [`SchemaError::InvalidBounds`] for inverted rule bounds
    pub fn build(mut self) -> Result<MemberDescriptor, SchemaError> {
        for rule in self.rules.iter().chain(&self.element_rules) {
            rule.constraint().check_config(&self.name)?;
        }

        let required_count = self.rules.iter().filter(|r| r.is_required()).count();
        if required_count > 1 {
            return Err(SchemaError::DuplicateRequired { member: self.name });
        }
        if self.required_flag && required_count == 0 {
            return Err(SchemaError::RequiredWithoutCheck { member: self.name });
        }
        if let Some(pos) = self.rules.iter().position(Rule::is_required) {
            let required = self.rules.remove(pos);
            self.rules.insert(0, required);
        }

        Ok(MemberDescriptor {
            display_name: self.display_name.unwrap_or_else(|| self.name.clone()),
            is_enumerable: self.declared.is_enumerable(),
            is_nullable: self.declared.is_nullable(),
            is_required: required_count == 1,
            name: self.name,
            declared: self.declared,
            nested_type: self.nested_type,
            rules: self.rules,
            element_rules: self.element_rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_helpers() {
        let tags = DeclaredType::list(DeclaredType::Text);
        assert!(tags.is_enumerable());
        assert!(!DeclaredType::Text.is_enumerable());
        assert_eq!(tags.element_type(), Some(&DeclaredType::Text));

        let addresses = DeclaredType::optional(DeclaredType::list(DeclaredType::named("Address")));
        assert!(addresses.is_enumerable());
        assert_eq!(addresses.named_target().map(TypeName::as_str), Some("Address"));
        assert_eq!(addresses.to_string(), "list<Address>?");

        assert!(!DeclaredType::Int.is_nullable());
        assert!(DeclaredType::optional(DeclaredType::Int).is_nullable());
    }

    #[test]
    fn test_text_is_nullable_like_references() {
        for declared in [
            DeclaredType::Text,
            DeclaredType::named("Address"),
            DeclaredType::list(DeclaredType::Int),
        ] {
            assert!(declared.is_nullable(), "{declared}");
        }
        for declared in [DeclaredType::Bool, DeclaredType::Int, DeclaredType::Float] {
            assert!(!declared.is_nullable(), "{declared}");
        }
    }

    #[test]
    fn test_required_rule_moves_first() {
        let member = MemberDescriptor::builder("name", DeclaredType::Text)
            .rule(Rule::min_length(2))
            .rule(Rule::required())
            .build()
            .unwrap();

        assert!(member.is_required());
        assert_eq!(member.rules()[0].kind(), "required");
        assert_eq!(member.rules()[1].kind(), "min_length");
        assert_eq!(member.display_name(), "name");
    }

    #[test]
    fn test_required_flag_without_check_fails() {
        let err = MemberDescriptor::builder("name", DeclaredType::Text)
            .required()
            .rule(Rule::min_length(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::RequiredWithoutCheck { ref member } if member == "name"));
    }

    #[test]
    fn test_duplicate_required_fails() {
        let err = MemberDescriptor::builder("name", DeclaredType::Text)
            .rule(Rule::required())
            .rule(Rule::required_allow_empty())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateRequired { .. }));
    }

    #[test]
    fn test_validatable_requires_rules_or_nesting() {
        let bare = MemberDescriptor::builder("note", DeclaredType::Text).build().unwrap();
        assert!(!bare.is_validatable());

        let nested = MemberDescriptor::builder("address", DeclaredType::named("Address"))
            .nested("Address")
            .build()
            .unwrap();
        assert!(nested.is_validatable());
        assert!(nested.has_nested_schema());
    }
}
