//! Declarative type metadata
//!
//! The [`TypeCatalog`] is what the reflection resolver reflects over: the
//! host registers one [`TypeDef`] per type with its members, their declared
//! rules, an optional self-validation hook and known subtypes.
//!
//! Types that are absent from the catalog are opaque. They are treated as
//! leaves and never cause an error.
//!
//! ```rust
//! use tessera_validator::rules::RuleSpec;
//! use tessera_validator::schema::{DeclaredType, MemberDef, TypeCatalog, TypeDef};
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.register(
//!     TypeDef::new("Customer")
//!         .member(MemberDef::new("name", DeclaredType::Text).spec(RuleSpec::required()))
//!         .member(MemberDef::new("address", DeclaredType::named("Address"))),
//! );
//! assert!(catalog.get(&"Customer".into()).is_some());
//! assert!(catalog.is_excluded(&"Uuid".into()));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::foundation::TypeName;
use crate::rules::{Rule, RuleSpec};

use super::member::DeclaredType;
use super::type_schema::SelfValidate;

/// Well-known value types that never carry a schema.
pub const WELL_KNOWN_LEAF_TYPES: &[&str] = &[
    "Uuid", "DateTime", "Date", "Time", "Duration", "Decimal", "Url", "IpAddr", "Bytes",
];

/// Framework plumbing types that must never be validated as data.
pub const FRAMEWORK_TYPES: &[&str] = &[
    "HttpContext",
    "HttpRequest",
    "HttpResponse",
    "CancellationToken",
    "ClaimsPrincipal",
    "ServiceProvider",
    "Stream",
    "FormFile",
];

// ============================================================================
// MEMBER DEF
// ============================================================================

/// Declared member (or parameter) metadata.
#[derive(Debug, Clone)]
pub struct MemberDef {
    /// Declared identifier.
    pub name: String,
    /// Human-facing label.
    pub display_name: Option<String>,
    /// Declared type.
    pub declared: DeclaredType,
    /// Authoring-surface `required` flag; needs a matching required rule.
    pub required: bool,
    /// Rules declared as data.
    pub specs: Vec<RuleSpec>,
    /// Rules registered in code.
    pub rules: Vec<Rule>,
    /// Rules applied to each element.
    pub element_specs: Vec<RuleSpec>,
}

impl MemberDef {
    /// Creates a member without rules.
    pub fn new(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            declared,
            required: false,
            specs: Vec::new(),
            rules: Vec::new(),
            element_specs: Vec::new(),
        }
    }

    /// Sets the display name.
    #[must_use = "builder methods must be chained or built"]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the `required` flag.
    #[must_use = "builder methods must be chained or built"]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declares a rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn spec(mut self, spec: RuleSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Attaches a code-registered rule (typically [`Rule::custom`]).
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Declares a per-element rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn element_spec(mut self, spec: RuleSpec) -> Self {
        self.element_specs.push(spec);
        self
    }

    /// Returns true if any required rule is declared.
    #[must_use]
    pub fn declares_required(&self) -> bool {
        self.specs.iter().any(RuleSpec::is_required) || self.rules.iter().any(Rule::is_required)
    }
}

// ============================================================================
// TYPE DEF
// ============================================================================

/// Declared type metadata.
///
/// A subtype lists only the members it adds; the base type's members are
/// validated through the base schema.
#[derive(Clone)]
pub struct TypeDef {
    /// Type name.
    pub name: TypeName,
    /// Members in declaration order.
    pub members: Vec<MemberDef>,
    /// Optional whole-object hook.
    pub self_validation: Option<Arc<dyn SelfValidate>>,
    /// Known polymorphic subtypes.
    pub subtypes: Vec<TypeName>,
}

impl TypeDef {
    /// Creates an empty type definition.
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            self_validation: None,
            subtypes: Vec::new(),
        }
    }

    /// Adds a member.
    #[must_use = "builder methods must be chained or built"]
    pub fn member(mut self, member: MemberDef) -> Self {
        self.members.push(member);
        self
    }

    /// Attaches a self-validation hook.
    #[must_use = "builder methods must be chained or built"]
    pub fn self_validation(mut self, hook: impl SelfValidate + 'static) -> Self {
        self.self_validation = Some(Arc::new(hook));
        self
    }

    /// Declares a subtype.
    #[must_use = "builder methods must be chained or built"]
    pub fn subtype(mut self, subtype: impl Into<TypeName>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("name", &self.name)
            .field("members", &self.members)
            .field("self_validation", &self.self_validation.is_some())
            .field("subtypes", &self.subtypes)
            .finish()
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Registry of declared types plus the leaf exclusion set.
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    types: IndexMap<TypeName, TypeDef>,
    excluded: HashSet<TypeName>,
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog {
    /// Creates a catalog with the built-in leaf and framework exclusions.
    #[must_use]
    pub fn new() -> Self {
        let excluded = WELL_KNOWN_LEAF_TYPES
            .iter()
            .chain(FRAMEWORK_TYPES)
            .map(TypeName::new)
            .collect();
        Self {
            types: IndexMap::new(),
            excluded,
        }
    }

    /// Registers (or replaces) a type definition.
    pub fn register(&mut self, def: TypeDef) -> &mut Self {
        self.types.insert(def.name.clone(), def);
        self
    }

    /// Builder-style [`register`](Self::register).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_type(mut self, def: TypeDef) -> Self {
        self.register(def);
        self
    }

    /// Suppresses validation of a type and everything below it.
    pub fn exclude(&mut self, name: impl Into<TypeName>) -> &mut Self {
        self.excluded.insert(name.into());
        self
    }

    /// Builder-style [`exclude`](Self::exclude).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_excluded(mut self, name: impl Into<TypeName>) -> Self {
        self.exclude(name);
        self
    }

    /// Returns true for leaf, framework and host-excluded types.
    #[must_use]
    pub fn is_excluded(&self, name: &TypeName) -> bool {
        self.excluded.contains(name)
    }

    /// Looks up a type definition.
    #[must_use]
    pub fn get(&self, name: &TypeName) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_exclusions() {
        let catalog = TypeCatalog::new();
        assert!(catalog.is_excluded(&TypeName::new("DateTime")));
        assert!(catalog.is_excluded(&TypeName::new("HttpContext")));
        assert!(!catalog.is_excluded(&TypeName::new("Customer")));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_host_exclusion() {
        let catalog = TypeCatalog::new().with_excluded("Money");
        assert!(catalog.is_excluded(&TypeName::new("Money")));
    }

    #[test]
    fn test_register_replaces() {
        let mut catalog = TypeCatalog::new();
        catalog.register(TypeDef::new("A"));
        catalog.register(TypeDef::new("A").subtype("B"));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(&"A".into()).map(|d| d.subtypes.len()), Some(1));
    }

    #[test]
    fn test_declares_required() {
        let member = MemberDef::new("name", DeclaredType::Text).spec(RuleSpec::required());
        assert!(member.declares_required());
        assert!(!MemberDef::new("name", DeclaredType::Text).declares_required());
    }
}
