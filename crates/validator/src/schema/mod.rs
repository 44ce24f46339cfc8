//! Schema resolution
//!
//! Resolution is the build-once half of validation: declared metadata is
//! turned into immutable [`TypeSchema`]s and [`MemberDescriptor`]s, cached
//! per type for the lifetime of the process.
//!
//! ```text
//! TypeCatalog ──► ReflectionResolver ─┐
//!                                     ├─► SchemaCache ──► Arc<TypeSchema>
//! host schemas ─► ExplicitResolver ───┘
//! ```
//!
//! Nested and subtype schemas are referenced by [`TypeName`](crate::foundation::TypeName)
//! and looked up in the cache when the traversal reaches them.

mod cache;
mod catalog;
mod explicit;
mod member;
mod reflect;
mod resolver;
mod type_schema;

pub use cache::{SchemaCache, SchemaCacheBuilder};
pub use catalog::{FRAMEWORK_TYPES, MemberDef, TypeCatalog, TypeDef, WELL_KNOWN_LEAF_TYPES};
pub use explicit::ExplicitResolver;
pub use member::{DeclaredType, MemberDescriptor, MemberDescriptorBuilder};
pub use reflect::ReflectionResolver;
pub use resolver::{ResolveContext, SchemaResolver};
pub use type_schema::{HookContext, SelfValidate, SelfValidationFailure, TypeSchema, TypeSchemaBuilder};
