//! Type schemas and the self-validation capability

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::{Object, Services, TypeName};

use super::member::MemberDescriptor;

// ============================================================================
// SELF VALIDATION
// ============================================================================

/// Information handed to a self-validation hook.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    /// Runtime type of the object, used as the display context.
    pub type_name: &'a TypeName,
    /// Error path of the object (empty at the root).
    pub path: &'a str,
    /// Host services.
    pub services: &'a Services,
}

/// One failure reported by a self-validation hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfValidationFailure {
    /// Failure message.
    pub message: String,
    /// Members the failure is about. Empty means the object as a whole.
    pub members: SmallVec<[String; 2]>,
}

impl SelfValidationFailure {
    /// Failure about the whole object.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            members: SmallVec::new(),
        }
    }

    /// Attaches the failure to a member (may be called repeatedly).
    #[must_use = "builder methods must be chained or built"]
    pub fn for_member(mut self, member: impl Into<String>) -> Self {
        self.members.push(member.into());
        self
    }
}

/// Whole-object check run after member validation.
pub trait SelfValidate: Send + Sync {
    /// Returns the failures for `value`; empty when valid.
    fn validate(&self, value: &Object, cx: &HookContext<'_>) -> Vec<SelfValidationFailure>;
}

impl<F> SelfValidate for F
where
    F: Fn(&Object, &HookContext<'_>) -> Vec<SelfValidationFailure> + Send + Sync,
{
    fn validate(&self, value: &Object, cx: &HookContext<'_>) -> Vec<SelfValidationFailure> {
        self(value, cx)
    }
}

// ============================================================================
// TYPE SCHEMA
// ============================================================================

/// Resolved, immutable description of a validatable type.
///
/// A schema always has at least one member, a self-validation hook or a
/// subtype; [`TypeSchemaBuilder::build`] returns `None` otherwise.
#[derive(Clone)]
pub struct TypeSchema {
    type_name: TypeName,
    members: Vec<MemberDescriptor>,
    self_validation: Option<Arc<dyn SelfValidate>>,
    subtypes: Vec<TypeName>,
}

impl TypeSchema {
    /// Starts building a schema.
    pub fn builder(type_name: impl Into<TypeName>) -> TypeSchemaBuilder {
        TypeSchemaBuilder::new(type_name)
    }

    /// Type described by this schema.
    #[must_use]
    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Members in declaration order.
    #[must_use]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Looks up a member by declared name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name() == name)
    }

    /// Returns true if the type has a self-validation hook.
    #[must_use]
    pub fn implements_self_validation(&self) -> bool {
        self.self_validation.is_some()
    }

    pub(crate) fn self_validation(&self) -> Option<&dyn SelfValidate> {
        self.self_validation.as_deref()
    }

    /// Known polymorphic subtypes.
    #[must_use]
    pub fn subtypes(&self) -> &[TypeName] {
        &self.subtypes
    }
}

impl fmt::Debug for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("type_name", &self.type_name)
            .field("members", &self.members)
            .field("implements_self_validation", &self.implements_self_validation())
            .field("subtypes", &self.subtypes)
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`TypeSchema`].
pub struct TypeSchemaBuilder {
    type_name: TypeName,
    members: Vec<MemberDescriptor>,
    self_validation: Option<Arc<dyn SelfValidate>>,
    subtypes: Vec<TypeName>,
}

impl TypeSchemaBuilder {
    fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            members: Vec::new(),
            self_validation: None,
            subtypes: Vec::new(),
        }
    }

    /// Adds a member. Members that cannot contribute errors are dropped.
    #[must_use = "builder methods must be chained or built"]
    pub fn member(mut self, member: MemberDescriptor) -> Self {
        if member.is_validatable() {
            self.members.push(member);
        }
        self
    }

    /// Attaches a self-validation hook.
    #[must_use = "builder methods must be chained or built"]
    pub fn self_validation(mut self, hook: impl SelfValidate + 'static) -> Self {
        self.self_validation = Some(Arc::new(hook));
        self
    }

    /// Attaches an already shared hook.
    #[must_use = "builder methods must be chained or built"]
    pub fn self_validation_arc(mut self, hook: Option<Arc<dyn SelfValidate>>) -> Self {
        self.self_validation = hook;
        self
    }

    /// Declares a polymorphic subtype.
    #[must_use = "builder methods must be chained or built"]
    pub fn subtype(mut self, subtype: impl Into<TypeName>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    /// Builds the schema, or `None` for a type that is not validatable.
    #[must_use]
    pub fn build(self) -> Option<TypeSchema> {
        if self.members.is_empty() && self.self_validation.is_none() && self.subtypes.is_empty() {
            return None;
        }
        Some(TypeSchema {
            type_name: self.type_name,
            members: self.members,
            self_validation: self.self_validation,
            subtypes: self.subtypes,
        })
    }
}

impl fmt::Debug for TypeSchemaBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchemaBuilder")
            .field("type_name", &self.type_name)
            .field("members", &self.members.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use crate::schema::DeclaredType;

    #[test]
    fn test_empty_type_is_not_validatable() {
        let schema = TypeSchema::builder("Note")
            .member(MemberDescriptor::builder("text", DeclaredType::Text).build().unwrap())
            .build();
        assert!(schema.is_none());
    }

    #[test]
    fn test_hook_alone_makes_a_schema() {
        let schema = TypeSchema::builder("Range")
            .self_validation(|_: &Object, _: &HookContext<'_>| Vec::<SelfValidationFailure>::new())
            .build()
            .unwrap();
        assert!(schema.implements_self_validation());
        assert!(schema.members().is_empty());
    }

    #[test]
    fn test_subtype_alone_makes_a_schema() {
        let schema = TypeSchema::builder("Shape").subtype("Circle").build().unwrap();
        assert_eq!(schema.subtypes(), &[TypeName::new("Circle")]);
    }

    #[test]
    fn test_member_lookup() {
        let schema = TypeSchema::builder("Customer")
            .member(
                MemberDescriptor::builder("name", DeclaredType::Text)
                    .rule(Rule::required())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert!(schema.member("name").is_some_and(MemberDescriptor::is_required));
        assert!(schema.member("age").is_none());
    }

    #[test]
    fn test_failure_members() {
        let failure = SelfValidationFailure::new("start must precede end")
            .for_member("start")
            .for_member("end");
        assert_eq!(failure.members.as_slice(), ["start", "end"]);
    }
}
