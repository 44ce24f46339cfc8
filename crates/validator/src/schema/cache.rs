//! Process-wide schema cache
//!
//! Schemas are resolved once per type and shared by every validation call.
//! Hits are served from a [`DashMap`] without blocking. Misses take a single
//! resolution gate, check the map again and resolve the whole reachable type
//! graph in one [`ResolveContext`]. Concurrent misses for the same type
//! therefore collapse into one resolution, and no thread ever sees a visiting
//! set built by another.
//!
//! Cached entries include negative results: a type that is not validatable is
//! remembered as `None` so the engine can skip it cheaply next time.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::foundation::{SchemaError, TypeName};

use super::catalog::MemberDef;
use super::member::MemberDescriptor;
use super::resolver::{ResolveContext, SchemaResolver};
use super::type_schema::TypeSchema;

/// Memoized resolver output.
pub struct SchemaCache {
    resolvers: Vec<Arc<dyn SchemaResolver>>,
    entries: DashMap<TypeName, Option<Arc<TypeSchema>>>,
    gate: Mutex<()>,
    resolutions: AtomicUsize,
}

impl SchemaCache {
    /// Creates a cache over a resolver chain, tried in order.
    #[must_use]
    pub fn new(resolvers: Vec<Arc<dyn SchemaResolver>>) -> Self {
        Self {
            resolvers,
            entries: DashMap::new(),
            gate: Mutex::new(()),
            resolutions: AtomicUsize::new(0),
        }
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> SchemaCacheBuilder {
        SchemaCacheBuilder::default()
    }

    /// Returns the schema of `type_name`, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Configuration errors raised by a resolver. Failed resolutions are not
    /// cached, so the next call retries.
    pub fn get_or_resolve(&self, type_name: &TypeName) -> Result<Option<Arc<TypeSchema>>, SchemaError> {
        if let Some(entry) = self.lookup(type_name) {
            return Ok(entry);
        }

        let _gate = self.gate.lock();
        // Another thread may have resolved it while we waited.
        if let Some(entry) = self.lookup(type_name) {
            return Ok(entry);
        }
        ResolveContext::new(self).resolve(type_name)
    }

    /// Resolves the descriptor of a bound parameter. Not cached.
    pub fn resolve_parameter(&self, parameter: &MemberDef) -> Result<Option<MemberDescriptor>, SchemaError> {
        let _gate = self.gate.lock();
        ResolveContext::new(self).resolve_parameter(parameter)
    }

    /// Drops every entry.
    ///
    /// Entries reference each other by type name, so invalidation is all or
    /// nothing.
    pub fn invalidate_all(&self) {
        let _gate = self.gate.lock();
        let dropped = self.entries.len();
        self.entries.clear();
        debug!(dropped, "schema cache invalidated");
    }

    /// Number of cached entries, negative ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `type_name` has a cached entry.
    #[must_use]
    pub fn contains(&self, type_name: &TypeName) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Number of times the resolver chain ran for a type.
    #[must_use]
    pub fn resolution_count(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub(crate) fn lookup(&self, type_name: &TypeName) -> Option<Option<Arc<TypeSchema>>> {
        self.entries.get(type_name).map(|entry| entry.value().clone())
    }

    pub(crate) fn store(&self, type_name: TypeName, schema: Option<Arc<TypeSchema>>) {
        self.entries.insert(type_name, schema);
    }

    pub(crate) fn resolvers(&self) -> &[Arc<dyn SchemaResolver>] {
        &self.resolvers
    }

    pub(crate) fn count_resolution(&self) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.resolvers.iter().map(|r| r.name()).collect();
        f.debug_struct("SchemaCache")
            .field("resolvers", &names)
            .field("entries", &self.entries.len())
            .field("resolutions", &self.resolution_count())
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`SchemaCache`].
#[derive(Default)]
pub struct SchemaCacheBuilder {
    resolvers: Vec<Arc<dyn SchemaResolver>>,
}

impl SchemaCacheBuilder {
    /// Appends a resolver to the chain.
    #[must_use = "builder methods must be chained or built"]
    pub fn resolver(mut self, resolver: impl SchemaResolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    /// Appends an already shared resolver.
    #[must_use = "builder methods must be chained or built"]
    pub fn shared_resolver(mut self, resolver: Arc<dyn SchemaResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Builds the cache.
    #[must_use]
    pub fn build(self) -> SchemaCache {
        SchemaCache::new(self.resolvers)
    }
}

impl fmt::Debug for SchemaCacheBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCacheBuilder")
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use crate::schema::{DeclaredType, ResolveContext};

    struct Fixed;

    impl SchemaResolver for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn resolve_type(
            &self,
            type_name: &TypeName,
            _cx: &mut ResolveContext<'_>,
        ) -> Result<Option<TypeSchema>, SchemaError> {
            if type_name.as_str() != "Order" {
                return Ok(None);
            }
            let member = MemberDescriptor::builder("id", DeclaredType::Int)
                .rule(Rule::min(1.0))
                .build()?;
            Ok(TypeSchema::builder("Order").member(member).build())
        }
    }

    #[test]
    fn test_caches_positive_and_negative_entries() {
        let cache = SchemaCache::builder().resolver(Fixed).build();

        let first = cache.get_or_resolve(&"Order".into()).unwrap().unwrap();
        let second = cache.get_or_resolve(&"Order".into()).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        assert!(cache.get_or_resolve(&"Other".into()).unwrap().is_none());
        assert!(cache.get_or_resolve(&"Other".into()).unwrap().is_none());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.resolution_count(), 2);
    }

    #[test]
    fn test_invalidate_all_forces_resolution() {
        let cache = SchemaCache::builder().resolver(Fixed).build();
        cache.get_or_resolve(&"Order".into()).unwrap();
        cache.invalidate_all();
        assert!(cache.is_empty());

        cache.get_or_resolve(&"Order".into()).unwrap();
        assert_eq!(cache.resolution_count(), 2);
        assert!(cache.contains(&"Order".into()));
    }
}
