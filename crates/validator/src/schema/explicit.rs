//! Host-authored schemas
//!
//! [`ExplicitResolver`] serves schemas and parameter descriptors that the
//! host built by hand. Registered ahead of reflection, it overrides the
//! catalog for the types it knows.
//!
//! Explicit schemas may reference themselves or each other through
//! [`MemberDescriptorBuilder::nested`](super::MemberDescriptorBuilder::nested):
//! nested schemas are looked up by type name at validation time, so cyclic
//! schemas are legal and instance cycles are bounded by the depth limit.

use std::collections::HashMap;

use tracing::warn;

use crate::foundation::{SchemaError, TypeName};

use super::catalog::MemberDef;
use super::member::MemberDescriptor;
use super::resolver::{ResolveContext, SchemaResolver};
use super::type_schema::TypeSchema;

/// Resolver over explicitly registered schemas.
#[derive(Debug, Default)]
pub struct ExplicitResolver {
    schemas: HashMap<TypeName, TypeSchema>,
    parameters: HashMap<String, MemberDescriptor>,
}

impl ExplicitResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its type name.
    pub fn register(&mut self, schema: TypeSchema) -> &mut Self {
        self.schemas.insert(schema.type_name().clone(), schema);
        self
    }

    /// Builder-style [`register`](Self::register).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_schema(mut self, schema: TypeSchema) -> Self {
        self.register(schema);
        self
    }

    /// Registers a parameter descriptor under its name.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_parameter(mut self, parameter: MemberDescriptor) -> Self {
        self.parameters.insert(parameter.name().to_owned(), parameter);
        self
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if no schema is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Warms nested types and reports the ones that resolve to nothing.
    fn check_nested(&self, schema: &TypeSchema, cx: &mut ResolveContext<'_>) -> Result<(), SchemaError> {
        for member in schema.members() {
            let Some(nested) = member.nested_type() else {
                continue;
            };
            if cx.is_visiting(nested) {
                continue;
            }
            if cx.resolve(nested)?.is_none() {
                warn!(
                    type_name = %schema.type_name(),
                    member = member.name(),
                    nested = %nested,
                    "explicit schema references a type without schema; nested validation will be skipped"
                );
            }
        }
        Ok(())
    }
}

impl SchemaResolver for ExplicitResolver {
    fn name(&self) -> &str {
        "explicit"
    }

    fn resolve_type(
        &self,
        type_name: &TypeName,
        cx: &mut ResolveContext<'_>,
    ) -> Result<Option<TypeSchema>, SchemaError> {
        let Some(schema) = self.schemas.get(type_name) else {
            return Ok(None);
        };
        self.check_nested(schema, cx)?;
        Ok(Some(schema.clone()))
    }

    fn resolve_parameter(
        &self,
        parameter: &MemberDef,
        _cx: &mut ResolveContext<'_>,
    ) -> Result<Option<MemberDescriptor>, SchemaError> {
        Ok(self.parameters.get(&parameter.name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use crate::schema::{DeclaredType, SchemaCache};

    fn node_schema() -> TypeSchema {
        TypeSchema::builder("Node")
            .member(
                MemberDescriptor::builder("label", DeclaredType::Text)
                    .rule(Rule::required())
                    .build()
                    .unwrap(),
            )
            .member(
                MemberDescriptor::builder("next", DeclaredType::named("Node"))
                    .nested("Node")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_self_referencing_schema_resolves() {
        let cache = SchemaCache::builder()
            .resolver(ExplicitResolver::new().with_schema(node_schema()))
            .build();

        let schema = cache.get_or_resolve(&"Node".into()).unwrap().unwrap();
        assert!(schema.member("next").is_some_and(MemberDescriptor::has_nested_schema));
        assert_eq!(cache.resolution_count(), 1);
    }

    #[test]
    fn test_unresolvable_nested_type_is_warmed_as_none() {
        let schema = TypeSchema::builder("Order")
            .member(
                MemberDescriptor::builder("customer", DeclaredType::named("Customer"))
                    .nested("Customer")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let cache = SchemaCache::builder()
            .resolver(ExplicitResolver::new().with_schema(schema))
            .build();

        assert!(cache.get_or_resolve(&"Order".into()).unwrap().is_some());
        assert!(cache.contains(&"Customer".into()));
        assert!(cache.get_or_resolve(&"Customer".into()).unwrap().is_none());
    }
}
