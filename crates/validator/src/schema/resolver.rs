//! Schema resolver chain
//!
//! Resolvers turn type names (and parameter descriptions) into schemas. They
//! are tried in registration order and the first `Some` wins, which lets a
//! host override reflection for chosen types by registering an explicit
//! resolver first.
//!
//! A resolver that needs the schema of another type (a member's type, an
//! element type) must ask the [`ResolveContext`] it was handed, never the
//! cache directly: the context owns the visiting set that breaks type-level
//! cycles and already holds the cache's resolution gate.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, debug_span, trace};

use crate::foundation::{SchemaError, TypeName};

use super::cache::SchemaCache;
use super::catalog::MemberDef;
use super::member::MemberDescriptor;
use super::type_schema::TypeSchema;

// ============================================================================
// RESOLVER TRAIT
// ============================================================================

/// Produces schemas for types and descriptors for parameters.
pub trait SchemaResolver: Send + Sync {
    /// Resolver name, used in logs and errors.
    fn name(&self) -> &str;

    /// Resolves the schema of `type_name`.
    ///
    /// `Ok(None)` declines: the next resolver in the chain is tried, and if
    /// none accepts, the type is not validatable.
    fn resolve_type(
        &self,
        type_name: &TypeName,
        cx: &mut ResolveContext<'_>,
    ) -> Result<Option<TypeSchema>, SchemaError>;

    /// Resolves the descriptor of a bound parameter. Declines by default.
    fn resolve_parameter(
        &self,
        parameter: &MemberDef,
        cx: &mut ResolveContext<'_>,
    ) -> Result<Option<MemberDescriptor>, SchemaError> {
        let _ = (parameter, cx);
        Ok(None)
    }
}

// ============================================================================
// RESOLVE CONTEXT
// ============================================================================

/// State of one top-level resolution.
///
/// Created by [`SchemaCache`] while it holds its resolution gate.
pub struct ResolveContext<'c> {
    cache: &'c SchemaCache,
    visiting: HashSet<TypeName>,
}

impl<'c> ResolveContext<'c> {
    pub(crate) fn new(cache: &'c SchemaCache) -> Self {
        Self {
            cache,
            visiting: HashSet::new(),
        }
    }

    /// Returns true if `type_name` is currently under construction.
    #[must_use]
    pub fn is_visiting(&self, type_name: &TypeName) -> bool {
        self.visiting.contains(type_name)
    }

    /// Resolves `type_name` through the cache and the resolver chain.
    ///
    /// A type that is already under construction resolves to `None` without
    /// being cached: the referencing member simply gets no nested schema.
    pub fn resolve(&mut self, type_name: &TypeName) -> Result<Option<Arc<TypeSchema>>, SchemaError> {
        if let Some(entry) = self.cache.lookup(type_name) {
            trace!(type_name = %type_name, "schema cache hit");
            return Ok(entry);
        }

        if self.visiting.contains(type_name) {
            trace!(type_name = %type_name, "type cycle cut during schema resolution");
            return Ok(None);
        }

        let span = debug_span!("resolve_type", type_name = %type_name);
        let _enter = span.enter();

        self.visiting.insert(type_name.clone());
        let outcome = self.run_chain(type_name);
        self.visiting.remove(type_name);

        let (resolver, schema) = outcome?;
        let schema = schema.map(Arc::new);
        self.cache.store(type_name.clone(), schema.clone());

        match (&schema, resolver) {
            (Some(schema), Some(resolver)) => debug!(
                resolver,
                members = schema.members().len(),
                subtypes = schema.subtypes().len(),
                self_validation = schema.implements_self_validation(),
                "resolved schema"
            ),
            _ => debug!("type is not validatable"),
        }
        Ok(schema)
    }

    fn run_chain(&mut self, type_name: &TypeName) -> Result<(Option<&'c str>, Option<TypeSchema>), SchemaError> {
        let cache = self.cache;
        cache.count_resolution();
        for resolver in cache.resolvers() {
            if let Some(schema) = resolver.resolve_type(type_name, self)? {
                return Ok((Some(resolver.name()), Some(schema)));
            }
        }
        Ok((None, None))
    }

    /// Runs the chain for a parameter. Parameters are not cached.
    pub(crate) fn resolve_parameter(
        &mut self,
        parameter: &MemberDef,
    ) -> Result<Option<MemberDescriptor>, SchemaError> {
        let cache = self.cache;
        for resolver in cache.resolvers() {
            if let Some(member) = resolver.resolve_parameter(parameter, self)? {
                debug!(
                    resolver = resolver.name(),
                    parameter = %parameter.name,
                    "resolved parameter"
                );
                return Ok(Some(member));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveContext")
            .field("visiting", &self.visiting)
            .finish_non_exhaustive()
    }
}
