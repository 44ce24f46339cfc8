//! Prelude module for convenient imports.
//!
//! Provides a single `use tessera_validator::prelude::*;` import that brings
//! in the types needed to declare schemas and validate values.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use tessera_validator::prelude::*;
//!
//! let catalog = TypeCatalog::new().with_type(
//!     TypeDef::new("User").member(MemberDef::new("age", DeclaredType::Int).spec(RuleSpec::min(0.0))),
//! );
//! let cache = SchemaCache::builder().resolver(ReflectionResolver::new(catalog)).build();
//! let validator = Validator::new(Arc::new(cache));
//!
//! let errors = validator.check(&"User".into(), &Object::new("User").with("age", -1).into()).unwrap();
//! assert_eq!(errors.get("age").unwrap(), ["must be >= 0"]);
//! ```

// ============================================================================
// FOUNDATION: Values, errors, ambient state
// ============================================================================

pub use crate::foundation::{
    ErrorMap, KeyNaming, Object, RuleError, SchemaError, Services, TypeName, ValidationFault, Value,
};

// ============================================================================
// RULES
// ============================================================================

pub use crate::rules::{ConstraintRule, Rule, RuleContext, RuleSpec};

// ============================================================================
// SCHEMA: Descriptors, resolvers, cache
// ============================================================================

pub use crate::schema::{
    DeclaredType, ExplicitResolver, HookContext, MemberDef, MemberDescriptor, ReflectionResolver,
    SchemaCache, SchemaResolver, SelfValidate, SelfValidationFailure, TypeCatalog, TypeDef,
    TypeSchema,
};

// ============================================================================
// ENGINE
// ============================================================================

pub use crate::engine::{DepthPolicy, ValidationContext, Validator, ValidatorOptions};
