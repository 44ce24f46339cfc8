//! Reflection over the type catalog
//!
//! [`ReflectionResolver`] is the default resolver. For a requested type it:
//!
//! 1. declines leaf, framework and host-excluded types, and types the catalog
//!    does not know (opaque types are leaves, never errors)
//! 2. compiles every member's declared rules
//! 3. resolves the member's unwrapped element type through the
//!    [`ResolveContext`], which cuts type cycles
//! 4. drops members with neither rules nor a nested schema
//! 5. builds the schema, which is `None` when nothing validatable is left

use std::sync::Arc;

use crate::foundation::{SchemaError, TypeName};

use super::catalog::{MemberDef, TypeCatalog};
use super::member::MemberDescriptor;
use super::resolver::{ResolveContext, SchemaResolver};
use super::type_schema::TypeSchema;

/// Default resolver over a [`TypeCatalog`].
#[derive(Debug, Clone)]
pub struct ReflectionResolver {
    catalog: Arc<TypeCatalog>,
}

impl ReflectionResolver {
    /// Creates a resolver over `catalog`.
    #[must_use]
    pub fn new(catalog: TypeCatalog) -> Self {
        Self::shared(Arc::new(catalog))
    }

    /// Creates a resolver over a shared catalog.
    #[must_use]
    pub fn shared(catalog: Arc<TypeCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog this resolver reflects over.
    #[must_use]
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Builds the descriptor of one member.
    fn describe(&self, def: &MemberDef, cx: &mut ResolveContext<'_>) -> Result<MemberDescriptor, SchemaError> {
        let nested = match def.declared.named_target() {
            Some(target) if !self.catalog.is_excluded(target) => {
                cx.resolve(target)?.map(|schema| schema.type_name().clone())
            }
            _ => None,
        };

        let mut builder = MemberDescriptor::builder(&def.name, def.declared.clone()).nested_opt(nested);
        if let Some(display_name) = &def.display_name {
            builder = builder.display_name(display_name);
        }
        if def.required {
            builder = builder.required();
        }
        for spec in &def.specs {
            builder = builder.rule(spec.compile(&def.name)?);
        }
        builder = builder.rules(def.rules.iter().cloned());
        for spec in &def.element_specs {
            builder = builder.element_rule(spec.compile(&def.name)?);
        }
        builder.build()
    }
}

impl SchemaResolver for ReflectionResolver {
    fn name(&self) -> &str {
        "reflection"
    }

    fn resolve_type(
        &self,
        type_name: &TypeName,
        cx: &mut ResolveContext<'_>,
    ) -> Result<Option<TypeSchema>, SchemaError> {
        if self.catalog.is_excluded(type_name) {
            return Ok(None);
        }
        let Some(def) = self.catalog.get(type_name) else {
            return Ok(None);
        };

        let mut builder = TypeSchema::builder(def.name.clone())
            .self_validation_arc(def.self_validation.clone());
        for member in &def.members {
            builder = builder.member(self.describe(member, cx)?);
        }
        for subtype in &def.subtypes {
            builder = builder.subtype(subtype.clone());
        }
        Ok(builder.build())
    }

    fn resolve_parameter(
        &self,
        parameter: &MemberDef,
        cx: &mut ResolveContext<'_>,
    ) -> Result<Option<MemberDescriptor>, SchemaError> {
        let member = self.describe(parameter, cx)?;
        Ok(member.is_validatable().then_some(member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSpec;
    use crate::schema::{DeclaredType, SchemaCache, TypeDef};

    fn cache(catalog: TypeCatalog) -> SchemaCache {
        SchemaCache::builder()
            .resolver(ReflectionResolver::new(catalog))
            .build()
    }

    #[test]
    fn test_members_without_rules_or_nesting_are_dropped() {
        let catalog = TypeCatalog::new().with_type(
            TypeDef::new("Customer")
                .member(MemberDef::new("name", DeclaredType::Text).spec(RuleSpec::required()))
                .member(MemberDef::new("note", DeclaredType::Text)),
        );
        let schema = cache(catalog).get_or_resolve(&"Customer".into()).unwrap().unwrap();

        assert_eq!(schema.members().len(), 1);
        assert_eq!(schema.members()[0].name(), "name");
    }

    #[test]
    fn test_excluded_member_type_is_not_descended() {
        let catalog = TypeCatalog::new()
            .with_type(
                TypeDef::new("Money")
                    .member(MemberDef::new("amount", DeclaredType::Float).spec(RuleSpec::min(0.0))),
            )
            .with_type(TypeDef::new("Order").member(MemberDef::new("total", DeclaredType::named("Money"))))
            .with_excluded("Money");

        let cache = cache(catalog);
        assert!(cache.get_or_resolve(&"Order".into()).unwrap().is_none());
        assert!(cache.get_or_resolve(&"Money".into()).unwrap().is_none());
    }

    #[test]
    fn test_required_flag_needs_rule() {
        let catalog = TypeCatalog::new().with_type(
            TypeDef::new("Customer").member(MemberDef::new("name", DeclaredType::Text).required()),
        );
        let err = cache(catalog).get_or_resolve(&"Customer".into()).unwrap_err();
        assert!(matches!(err, SchemaError::RequiredWithoutCheck { .. }));
    }

    #[test]
    fn test_parameter_without_rules_is_declined() {
        let cache = cache(TypeCatalog::new());
        let plain = MemberDef::new("q", DeclaredType::Text);
        assert!(cache.resolve_parameter(&plain).unwrap().is_none());

        let bounded = MemberDef::new("page", DeclaredType::Int).spec(RuleSpec::min(1.0));
        let member = cache.resolve_parameter(&bounded).unwrap().unwrap();
        assert_eq!(member.name(), "page");
    }
}
